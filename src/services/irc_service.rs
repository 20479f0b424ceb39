use log::debug;
use std::collections::HashMap;

use crate::models::badges::{BadgeCatalog, BadgeSelections};
use crate::models::chat_event::{ChatEvent, Notice, Notification};
use crate::models::emotes::EmoteRanges;
use crate::models::message::{Message, MessageType};
use crate::models::userstate::UserState;
use crate::services::message_parser::MessageParser;

const ACTION_PREFIX: &str = "\u{1}ACTION ";
const ACTION_SUFFIX: char = '\u{1}';

/// Outcome of one chat server line that the chat log cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum IrcEvent {
    Chat(ChatEvent),
    /// Whole chat cleared by a moderator
    ClearChat,
    /// Timeout or ban of one user
    ClearUser { user_id: String },
    /// Single message deleted
    ClearMessage { message_id: String },
}

/// Pieces of a raw IRC line, borrowed from it.
#[derive(Debug, Default, PartialEq)]
struct IrcLine<'a> {
    tags: HashMap<String, String>,
    login: Option<&'a str>,
    command: &'a str,
    trailing: Option<&'a str>,
}

/// Context needed to turn server lines into chat events.
pub struct IrcService<'a> {
    parser: &'a MessageParser,
    badges: Option<&'a BadgeCatalog>,
    self_login: Option<&'a str>,
}

impl<'a> IrcService<'a> {
    pub fn new(parser: &'a MessageParser) -> Self {
        Self {
            parser,
            badges: None,
            self_login: None,
        }
    }

    /// Badges known for the joined channel
    pub fn with_badges(mut self, badges: Option<&'a BadgeCatalog>) -> Self {
        self.badges = badges;
        self
    }

    /// Login of the local user, used to flag our own messages
    pub fn with_self_login(mut self, login: &'a str) -> Self {
        self.self_login = Some(login);
        self
    }

    /// Parse one raw line. Returns `None` for anything that does not
    /// produce a chat log entry (PING, JOIN, ROOMSTATE, ...).
    pub fn parse_line(&self, raw: &str) -> Option<IrcEvent> {
        let line = split_line(raw.trim_end_matches(['\r', '\n']))?;

        match line.command {
            "PRIVMSG" => {
                let text = line.trailing.unwrap_or("");
                let (text, kind) = match text.strip_prefix(ACTION_PREFIX) {
                    Some(action) => (
                        action.strip_suffix(ACTION_SUFFIX).unwrap_or(action),
                        MessageType::Action,
                    ),
                    None => (text, MessageType::Chat),
                };
                let message = self.message(&line, text, kind);
                Some(IrcEvent::Chat(ChatEvent::Message(message)))
            }
            "WHISPER" => {
                let text = line.trailing.unwrap_or("");
                let message = self.message(&line, text, MessageType::Whisper);
                Some(IrcEvent::Chat(ChatEvent::Whisper(message)))
            }
            "NOTICE" => {
                let text = line.trailing?;
                Some(IrcEvent::Chat(ChatEvent::Notice(Notice::new(text))))
            }
            "USERNOTICE" => {
                let title = line
                    .tags
                    .get("system-msg")
                    .or_else(|| line.tags.get("msg-id"))
                    .map(String::as_str)
                    .unwrap_or("");
                let notification = Notification::new(title, line.trailing);
                Some(IrcEvent::Chat(ChatEvent::Notification(notification)))
            }
            "CLEARCHAT" => match line.tags.get("target-user-id") {
                Some(user_id) => Some(IrcEvent::ClearUser {
                    user_id: user_id.clone(),
                }),
                None => Some(IrcEvent::ClearChat),
            },
            "CLEARMSG" => {
                let message_id = line.tags.get("target-msg-id")?.clone();
                Some(IrcEvent::ClearMessage { message_id })
            }
            other => {
                debug!("[IRC Chat] Ignoring {} line", other);
                None
            }
        }
    }

    fn message(&self, line: &IrcLine, text: &str, kind: MessageType) -> Message {
        let userstate = userstate_from_tags(&line.tags, line.login, kind);
        let is_self = match (self.self_login, line.login) {
            (Some(me), Some(login)) => me.eq_ignore_ascii_case(login),
            _ => false,
        };

        Message::parse_with(self.parser, text, &userstate, is_self, self.badges)
    }
}

/// Build a userstate from the tags of a PRIVMSG or WHISPER line.
pub fn userstate_from_tags(
    tags: &HashMap<String, String>,
    login: Option<&str>,
    kind: MessageType,
) -> UserState {
    let tag = |name: &str| tags.get(name).filter(|v| !v.is_empty()).cloned();

    let sent_ts = tag("tmi-sent-ts").unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
            .to_string()
    });

    UserState {
        id: tag("id").unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        color: tag("color"),
        sent_ts: Some(sent_ts),
        message_type: kind,
        emotes: tag("emotes").map(|e| EmoteRanges::parse_tag(&e)),
        badges: tag("badges").map(|b| BadgeSelections::parse_tag(&b)),
        user_id: tag("user-id"),
        username: login.map(str::to_string),
        display_name: tag("display-name"),
        is_mod: tags.get("mod").is_some_and(|m| m == "1"),
    }
}

fn split_line(raw: &str) -> Option<IrcLine<'_>> {
    let mut rest = raw;
    let mut tags = HashMap::new();

    if let Some(tagged) = rest.strip_prefix('@') {
        let (tag_section, after) = tagged.split_once(' ')?;
        tags = parse_tags(tag_section);
        rest = after;
    }

    let mut login = None;
    if let Some(prefixed) = rest.strip_prefix(':') {
        let (prefix, after) = prefixed.split_once(' ')?;
        // :username!username@username.tmi.twitch.tv
        login = prefix.split_once('!').map(|(user, _)| user);
        rest = after;
    }

    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
    let trailing = match params.strip_prefix(':') {
        Some(trailing) => Some(trailing),
        None => params.split_once(" :").map(|(_, trailing)| trailing),
    };

    Some(IrcLine {
        tags,
        login,
        command,
        trailing,
    })
}

fn parse_tags(section: &str) -> HashMap<String, String> {
    section
        .split(';')
        .filter_map(|tag| {
            let mut parts = tag.splitn(2, '=');
            let key = parts.next().filter(|k| !k.is_empty())?;
            let value = unescape_tag_value(parts.next().unwrap_or(""));
            Some((key.to_string(), value))
        })
        .collect()
}

/// Undo IRCv3 tag value escaping.
fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => unescaped.push(';'),
            Some('s') => unescaped.push(' '),
            Some('\\') => unescaped.push('\\'),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => {}
        }
    }

    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badges::BadgeVersion;

    const PRIVMSG: &str = "@badge-info=subscriber/8;badges=moderator/1,subscriber/6;color=#0D4200;\
display-name=Ronni;emotes=25:0-4,12-16/1902:6-10;id=b34ccfc7-4977-403a-8a94-33c6bac34fb8;mod=1;\
room-id=1337;tmi-sent-ts=1507246572675;user-id=1337;user-type=mod \
:ronni!ronni@ronni.tmi.twitch.tv PRIVMSG #ronni :Kappa Keepo Kappa\r\n";

    fn catalog() -> BadgeCatalog {
        let mut catalog = BadgeCatalog::new();
        catalog.insert(
            "moderator",
            "1",
            BadgeVersion {
                image_url_1x: "https://cdn/mod/1".to_string(),
                image_url_2x: "https://cdn/mod/2".to_string(),
                image_url_4x: "https://cdn/mod/3".to_string(),
                description: "Moderator".to_string(),
                title: None,
            },
        );
        catalog
    }

    fn chat_message(event: Option<IrcEvent>) -> Message {
        match event {
            Some(IrcEvent::Chat(ChatEvent::Message(m))) => m,
            other => panic!("expected a chat message, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_privmsg() {
        let parser = MessageParser::default();
        let badges = catalog();
        let service = IrcService::new(&parser)
            .with_badges(Some(&badges))
            .with_self_login("someone_else");

        let message = chat_message(service.parse_line(PRIVMSG));

        assert_eq!(message.id(), "b34ccfc7-4977-403a-8a94-33c6bac34fb8");
        assert_eq!(message.raw(), "Kappa Keepo Kappa");
        assert_eq!(message.message().matches(r#"<img class="emote""#).count(), 3);
        assert!(message.message().contains(r#"alt="Keepo""#));
        assert_eq!(message.badges().unwrap().matches("<img").count(), 1);
        assert_eq!(message.color(), Some("#0D4200"));
        assert_eq!(message.date(), "1507246572675");
        assert_eq!(message.kind(), MessageType::Chat);
        assert_eq!(message.user().id, "1337");
        assert_eq!(message.user().name, "ronni");
        assert_eq!(message.user().display_name, "Ronni");
        assert!(message.user().is_mod);
        assert!(!message.is_self());
    }

    #[test]
    fn test_parse_action_from_self() {
        let parser = MessageParser::default();
        let service = IrcService::new(&parser).with_self_login("Ronni");
        let line = "@id=a1;user-id=1;emotes=25:6-10 :ronni!ronni@ronni.tmi.twitch.tv PRIVMSG #ronni :\u{1}ACTION waves Kappa\u{1}";

        let message = chat_message(service.parse_line(line));

        assert_eq!(message.kind(), MessageType::Action);
        assert_eq!(message.raw(), "waves Kappa");
        assert!(message.message().starts_with("waves <img"));
        assert!(message.is_self());
    }

    #[test]
    fn test_parse_whisper() {
        let parser = MessageParser::default();
        let service = IrcService::new(&parser);
        let line = "@color=;display-name=Friend;emotes=;message-id=1;user-id=55 :friend!friend@friend.tmi.twitch.tv WHISPER me :hey <you>";

        match service.parse_line(line) {
            Some(IrcEvent::Chat(ChatEvent::Whisper(m))) => {
                assert_eq!(m.kind(), MessageType::Whisper);
                assert_eq!(m.message(), "hey &lt;you&gt;");
                assert_eq!(m.color(), None);
                assert!(!m.id().is_empty());
            }
            other => panic!("expected whisper, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_notice_and_usernotice() {
        let parser = MessageParser::default();
        let service = IrcService::new(&parser);

        match service.parse_line("@msg-id=slow_on :tmi.twitch.tv NOTICE #ronni :This room is now in slow mode.") {
            Some(IrcEvent::Chat(ChatEvent::Notice(n))) => {
                assert_eq!(n.message, "This room is now in slow mode.")
            }
            other => panic!("expected notice, got {:?}", other),
        }

        let sub = "@msg-id=resub;system-msg=Ronni\\ssubscribed\\sfor\\s3\\smonths! :tmi.twitch.tv USERNOTICE #ronni :Great <stream>";
        match service.parse_line(sub) {
            Some(IrcEvent::Chat(ChatEvent::Notification(n))) => {
                assert_eq!(n.title, "Ronni subscribed for 3 months!");
                assert_eq!(n.message.as_deref(), Some("Great &lt;stream&gt;"));
            }
            other => panic!("expected notification, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_moderation_lines() {
        let parser = MessageParser::default();
        let service = IrcService::new(&parser);

        assert_eq!(
            service.parse_line("@ban-duration=600;room-id=1;target-user-id=42 :tmi.twitch.tv CLEARCHAT #ronni :troll"),
            Some(IrcEvent::ClearUser { user_id: "42".to_string() })
        );
        assert_eq!(
            service.parse_line("@room-id=1 :tmi.twitch.tv CLEARCHAT #ronni"),
            Some(IrcEvent::ClearChat)
        );
        assert_eq!(
            service.parse_line("@login=troll;target-msg-id=abc :tmi.twitch.tv CLEARMSG #ronni :bad"),
            Some(IrcEvent::ClearMessage { message_id: "abc".to_string() })
        );
    }

    #[test]
    fn test_ignored_lines() {
        let parser = MessageParser::default();
        let service = IrcService::new(&parser);
        assert_eq!(service.parse_line("PING :tmi.twitch.tv"), None);
        assert_eq!(service.parse_line(":ronni!ronni@ronni.tmi.twitch.tv JOIN #ronni"), None);
        assert_eq!(service.parse_line("@broken"), None);
    }

    #[test]
    fn test_unescape_tag_value() {
        assert_eq!(unescape_tag_value(r"a\sb\:c\\d"), r"a b;c\d");
        assert_eq!(unescape_tag_value(r"line\r\nend\"), "line\r\nend");
        assert_eq!(unescape_tag_value("plain"), "plain");
    }

    #[test]
    fn test_userstate_from_tags_defaults() {
        let tags = parse_tags("color=;emotes=;badges=");
        let state = userstate_from_tags(&tags, Some("viewer"), MessageType::Chat);

        assert!(!state.id.is_empty());
        assert!(state.color.is_none());
        assert!(state.emotes.is_none());
        assert!(state.badges.is_none());
        assert!(state.sent_at_ms().is_some());
        assert_eq!(state.username.as_deref(), Some("viewer"));
    }
}
