use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::badges::BadgeCatalog;
use crate::models::chatter::{Chatter, SerializedChatter};
use crate::models::userstate::UserState;
use crate::services::message_parser::MessageParser;
use crate::utils::html::escape;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Chat,
    /// `/me` message
    Action,
    Whisper,
}

/// A chat message, an action (/me) or a whisper.
///
/// The annotated text and badge markup are computed once when the message
/// is built. Color changes and purges produce a new `Message`; the owner
/// of the stored message swaps it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    user: Chatter,
    color: Option<String>,
    badges: Option<String>,
    id: String,
    date: String,
    time: String,
    raw: String,
    message: String,
    kind: MessageType,
    is_self: bool,
    purged: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SerializedMessage {
    pub badges: Option<String>,
    pub color: Option<String>,
    pub date: String,
    pub id: String,
    pub message: String,
    pub purged: bool,
    #[serde(rename = "self")]
    pub is_self: bool,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub user: SerializedChatter,
}

impl Message {
    /// Parse a received message with the default parser.
    pub fn new(
        message: &str,
        userstate: &UserState,
        is_self: bool,
        badges: Option<&BadgeCatalog>,
    ) -> Self {
        Self::parse_with(&MessageParser::default(), message, userstate, is_self, badges)
    }

    pub fn parse_with(
        parser: &MessageParser,
        message: &str,
        userstate: &UserState,
        is_self: bool,
        badges: Option<&BadgeCatalog>,
    ) -> Self {
        let sent_at = userstate
            .sent_at_ms()
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let date = userstate
            .sent_ts
            .clone()
            .unwrap_or_else(|| sent_at.to_string());

        let badges = match (badges, userstate.badges.as_ref()) {
            (Some(catalog), Some(selections)) if !selections.is_empty() => {
                parser.parse_badges(selections, catalog)
            }
            _ => None,
        };

        let annotated = match userstate.emotes.as_ref() {
            Some(emotes) if !emotes.is_empty() => parser.parse_emotes(message, emotes),
            _ => escape(message),
        };

        Self {
            user: Chatter::new(userstate),
            color: userstate.color.clone(),
            badges,
            id: userstate.id.clone(),
            date,
            time: format_time(sent_at, &Local),
            raw: message.to_string(),
            message: annotated,
            kind: userstate.message_type,
            is_self,
            purged: false,
        }
    }

    /// Copy of this message with a new sender color, applied to both the
    /// message and its sender.
    pub fn with_color(&self, color: Option<String>) -> Self {
        let mut updated = self.clone();
        updated.user.color = color.clone();
        updated.color = color;
        updated
    }

    /// Copy of this message flagged as removed by moderation. Renderers
    /// must not show the text of a purged message.
    pub fn purge(&self) -> Self {
        Self {
            purged: true,
            ..self.clone()
        }
    }

    pub fn serialize(&self) -> SerializedMessage {
        SerializedMessage {
            badges: self.badges.clone(),
            color: self.color.clone(),
            date: self.date.clone(),
            id: self.id.clone(),
            message: self.message.clone(),
            purged: self.purged,
            is_self: self.is_self,
            time: self.time.clone(),
            kind: self.kind,
            user: self.user.serialize(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &Chatter {
        &self.user
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn badges(&self) -> Option<&str> {
        self.badges.as_deref()
    }

    /// Escaped and emote-annotated text
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn is_self(&self) -> bool {
        self.is_self
    }

    pub fn is_purged(&self) -> bool {
        self.purged
    }
}

/// `HH:MM` display time of an epoch-millisecond timestamp in `tz`.
pub fn format_time<Tz>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badges::BadgeVersion;
    use chrono::FixedOffset;

    fn userstate(json: &str) -> UserState {
        UserState::from_json(json).unwrap()
    }

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

    #[test]
    fn test_plain_message() {
        let state = userstate(
            r##"{"id": "m1", "color": "#FF0000", "tmi-sent-ts": "1507246572675",
                "message-type": "chat", "user-id": "42", "username": "viewer"}"##,
        );
        let message = Message::new("gg <3", &state, false, Some(&catalog()));

        assert_eq!(message.message(), "gg &lt;3");
        assert_eq!(message.raw(), "gg <3");
        assert_eq!(message.badges(), None);
        assert_eq!(message.date(), "1507246572675");
        assert_eq!(message.time().len(), 5);
        assert_eq!(message.user().display_name, "viewer");
        assert!(!message.is_purged());
    }

    #[test]
    fn test_emote_message() {
        let state = userstate(r#"{"id": "m2", "emotes": {"25": ["0-4"]}}"#);
        let message = Message::new("Kappa hello", &state, false, None);

        assert!(message
            .message()
            .starts_with(r#"<img class="emote" src="https://static-cdn.jtvnw.net/emoticons/v1/25/1.0""#));
        assert!(message.message().ends_with(r#"alt="Kappa" /> hello"#));
    }

    #[test]
    fn test_empty_emote_map_escapes_text() {
        let state = userstate(r#"{"id": "m3", "emotes": {}}"#);
        let message = Message::new("a & b", &state, false, None);
        assert_eq!(message.message(), "a &amp; b");
    }

    #[test]
    fn test_badges_require_catalog_and_selection() {
        let state = userstate(r#"{"id": "m4", "badges": {"moderator": "1"}}"#);
        assert!(Message::new("hi", &state, false, None).badges().is_none());
        assert!(Message::new("hi", &state, false, Some(&catalog()))
            .badges()
            .unwrap()
            .contains(r#"alt="Moderator""#));

        let missing_version = userstate(r#"{"id": "m5", "badges": {"moderator": "2"}}"#);
        assert!(Message::new("hi", &missing_version, false, Some(&catalog()))
            .badges()
            .is_none());
    }

    #[test]
    fn test_with_color_updates_message_and_user() {
        let state = userstate(r##"{"id": "m6", "color": "#111111", "user-id": "7"}"##);
        let message = Message::new("hello", &state, true, None);
        let recolored = message.with_color(Some("#222222".to_string()));

        let serialized = recolored.serialize();
        assert_eq!(serialized.color.as_deref(), Some("#222222"));
        assert_eq!(serialized.user.color.as_deref(), Some("#222222"));
        assert_eq!(message.color(), Some("#111111"));

        assert_eq!(recolored.with_color(Some("#222222".to_string())), recolored);
    }

    #[test]
    fn test_purge_is_reflected_in_serialization() {
        let state = userstate(r#"{"id": "m7"}"#);
        let message = Message::new("bad words", &state, false, None);
        assert!(!message.serialize().purged);
        assert!(message.purge().serialize().purged);
    }

    #[test]
    fn test_serialized_shape() {
        let state = userstate(
            r#"{"id": "m8", "color": null, "tmi-sent-ts": "0", "message-type": "action",
                "user-id": "9", "username": "someone", "display-name": "SomeOne"}"#,
        );
        let value = serde_json::to_value(Message::new("waves", &state, true, None).serialize()).unwrap();

        assert_eq!(value["id"], "m8");
        assert_eq!(value["type"], "action");
        assert_eq!(value["self"], true);
        assert_eq!(value["message"], "waves");
        assert_eq!(value["date"], "0");
        assert!(value["badges"].is_null());
        assert_eq!(value["user"]["display_name"], "SomeOne");
        assert_eq!(value["user"]["name"], "someone");
    }

    #[test]
    fn test_format_time() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_time(1507246572675, &utc), "23:36");
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_time(1507246572675, &plus_two), "01:36");
        assert_eq!(format_time(0, &Utc), "00:00");
    }
}
