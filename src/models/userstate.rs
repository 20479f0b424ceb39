use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::badges::BadgeSelections;
use crate::models::emotes::EmoteRanges;
use crate::models::message::MessageType;

/// Sender and message metadata delivered alongside a chat line.
///
/// Field names follow the tag names the chat transport uses, so a payload
/// can be decoded straight from its JSON form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserState {
    /// Message id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Send time, epoch milliseconds encoded as a string
    #[serde(rename = "tmi-sent-ts", default)]
    pub sent_ts: Option<String>,
    #[serde(rename = "message-type", default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub emotes: Option<EmoteRanges>,
    #[serde(default)]
    pub badges: Option<BadgeSelections>,
    #[serde(rename = "user-id", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "display-name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "mod", default)]
    pub is_mod: bool,
}

impl UserState {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse userstate payload")
    }

    /// Send time in epoch milliseconds, if the payload carried a numeric one.
    pub fn sent_at_ms(&self) -> Option<i64> {
        self.sent_ts.as_deref()?.trim().parse().ok()
    }

    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.as_ref().is_some_and(|b| b.contains(name))
    }
}
