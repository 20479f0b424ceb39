use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::badges::{BadgeCatalog, BadgeSelections, BadgeVersion};
use crate::models::emotes::{EmoteRange, EmoteRanges};
use crate::models::settings::ChatSettings;
use crate::utils::html::escape;

pub const DEFAULT_EMOTE_CDN_URL: &str = "https://static-cdn.jtvnw.net/emoticons/v1";

/// Turns raw chat text and its metadata into escaped, annotated markup.
#[derive(Debug, Clone)]
pub struct MessageParser {
    emote_cdn_url: String,
    show_badges: bool,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self {
            emote_cdn_url: DEFAULT_EMOTE_CDN_URL.to_string(),
            show_badges: true,
        }
    }
}

/// One UTF-16 position of the message being annotated.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Text(char),
    /// Second code unit of a character outside the BMP
    Continuation,
    Blank,
    Markup(String),
}

impl MessageParser {
    pub fn new(emote_cdn_url: &str) -> Self {
        Self {
            emote_cdn_url: emote_cdn_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            show_badges: settings.show_badges,
            ..Self::new(&settings.emote_cdn_url)
        }
    }

    pub fn show_badges(&self) -> bool {
        self.show_badges
    }

    /// Build the badge markup for a sender.
    ///
    /// Selections missing from the catalog are skipped. Returns `None` when
    /// nothing matched so callers can tell "no badges" apart from markup.
    pub fn parse_badges(
        &self,
        selections: &BadgeSelections,
        catalog: &BadgeCatalog,
    ) -> Option<String> {
        if !self.show_badges {
            return None;
        }

        let parsed: Vec<String> = selections
            .iter()
            .filter_map(|selection| {
                let badge = catalog.get(&selection.name, &selection.version);
                if badge.is_none() {
                    debug!(
                        "[Badges] No catalog entry for {}/{}",
                        selection.name, selection.version
                    );
                }
                badge
            })
            .map(badge_markup)
            .collect();

        if parsed.is_empty() {
            None
        } else {
            Some(parsed.concat())
        }
    }

    /// Replace every emote range of `message` with an image fragment and
    /// escape the remaining text.
    ///
    /// Ranges are applied in the order supplied. A range is skipped when it
    /// falls outside the text, splits a surrogate pair, or touches text an
    /// earlier range already replaced.
    pub fn parse_emotes(&self, message: &str, emotes: &EmoteRanges) -> String {
        if emotes.is_empty() {
            return escape(message);
        }

        let mut slots: Vec<Slot> = Vec::with_capacity(message.len());
        for c in message.chars() {
            slots.push(Slot::Text(c));
            if c.len_utf16() == 2 {
                slots.push(Slot::Continuation);
            }
        }

        for (id, ranges) in emotes.iter() {
            if !is_safe_emote_id(id) {
                warn!("[Emotes] Skipping emote with unexpected id {:?}", id);
                continue;
            }

            for range in ranges {
                let Some(name) = capture_name(&slots, range) else {
                    warn!(
                        "[Emotes] Skipping range {}-{} for emote {} in a {}-unit message",
                        range.start,
                        range.end,
                        id,
                        slots.len()
                    );
                    continue;
                };

                for slot in &mut slots[range.start + 1..=range.end] {
                    *slot = Slot::Blank;
                }
                slots[range.start] = Slot::Markup(self.emote_markup(id, &name));
            }
        }

        let mut parsed = String::with_capacity(message.len());
        let mut text = String::new();
        for slot in slots {
            match slot {
                Slot::Text(c) => text.push(c),
                Slot::Markup(markup) => {
                    parsed.push_str(&escape(&text));
                    text.clear();
                    parsed.push_str(&markup);
                }
                Slot::Continuation | Slot::Blank => {}
            }
        }
        parsed.push_str(&escape(&text));

        parsed
    }

    fn emote_markup(&self, id: &str, name: &str) -> String {
        let base = format!("{}/{}", self.emote_cdn_url, id);
        let srcset = format!("{base}/1.0 1x,{base}/2.0 2x,{base}/3.0 4x");

        format!(
            r#"<img class="emote" src="{base}/1.0" srcset="{srcset}" alt="{}" />"#,
            escape(name)
        )
    }
}

fn badge_markup(badge: &BadgeVersion) -> String {
    let src = escape(&badge.image_url_1x);
    let srcset = format!(
        "{} 1x,{} 2x,{} 4x",
        src,
        escape(&badge.image_url_2x),
        escape(&badge.image_url_4x)
    );

    format!(
        r#"<img class="badge" src="{}" srcset="{}" alt="{}" />"#,
        src,
        srcset,
        escape(&badge.description)
    )
}

/// Emote ids end up unescaped inside URLs.
fn is_safe_emote_id(id: &str) -> bool {
    static EMOTE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
    EMOTE_ID.is_match(id)
}

/// Literal text covered by `range`, or `None` if the range cannot be applied.
fn capture_name(slots: &[Slot], range: &EmoteRange) -> Option<String> {
    if range.start > range.end || range.end >= slots.len() {
        return None;
    }
    if slots[range.start] == Slot::Continuation {
        return None;
    }
    if slots.get(range.end + 1) == Some(&Slot::Continuation) {
        return None;
    }

    let mut name = String::new();
    for slot in &slots[range.start..=range.end] {
        match slot {
            Slot::Text(c) => name.push(*c),
            Slot::Continuation => {}
            Slot::Blank | Slot::Markup(_) => return None,
        }
    }

    Some(name)
}
