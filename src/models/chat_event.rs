use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::models::message::{format_time, Message, SerializedMessage};
use crate::utils::html::escape;

/// Informational line from the chat server (e.g. "This room is now in
/// slow mode.").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    /// Escaped text
    pub message: String,
    pub time: String,
}

impl Notice {
    pub fn new(message: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: escape(message),
            time: format_time(chrono::Utc::now().timestamp_millis(), &Local),
        }
    }
}

/// Channel event such as a subscription or a raid, with optional user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Escaped title
    pub title: String,
    /// Escaped user text, if the event carried any
    pub message: Option<String>,
}

impl Notification {
    pub fn new(title: &str, message: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: escape(title),
            message: message.filter(|m| !m.is_empty()).map(escape),
        }
    }
}

/// Everything the chat log can show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Message(Message),
    Notice(Notice),
    Notification(Notification),
    Whisper(Message),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "log", rename_all = "lowercase")]
pub enum SerializedChatEvent {
    Message(SerializedMessage),
    Notice(Notice),
    Notification(Notification),
    Whisper(SerializedMessage),
}

impl ChatEvent {
    pub fn id(&self) -> &str {
        match self {
            ChatEvent::Message(m) | ChatEvent::Whisper(m) => m.id(),
            ChatEvent::Notice(n) => &n.id,
            ChatEvent::Notification(n) => &n.id,
        }
    }

    /// Sender id for messages and whispers.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            ChatEvent::Message(m) | ChatEvent::Whisper(m) => Some(&m.user().id),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            ChatEvent::Message(m) | ChatEvent::Whisper(m) => Some(m),
            _ => None,
        }
    }

    /// Rebuild a message-carrying event around a replacement message,
    /// keeping its variant.
    pub(crate) fn map_message(&self, f: impl FnOnce(&Message) -> Message) -> Option<ChatEvent> {
        match self {
            ChatEvent::Message(m) => Some(ChatEvent::Message(f(m))),
            ChatEvent::Whisper(m) => Some(ChatEvent::Whisper(f(m))),
            _ => None,
        }
    }

    pub fn serialize(&self) -> SerializedChatEvent {
        match self {
            ChatEvent::Message(m) => SerializedChatEvent::Message(m.serialize()),
            ChatEvent::Notice(n) => SerializedChatEvent::Notice(n.clone()),
            ChatEvent::Notification(n) => SerializedChatEvent::Notification(n.clone()),
            ChatEvent::Whisper(m) => SerializedChatEvent::Whisper(m.serialize()),
        }
    }
}
