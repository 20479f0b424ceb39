use log::debug;
use std::collections::VecDeque;

use crate::models::chat_event::{ChatEvent, SerializedChatEvent};
use crate::models::message::Message;
use crate::models::settings::ChatSettings;
use crate::services::irc_service::IrcEvent;

/// Ordered, bounded list of chat events for one channel.
///
/// Messages are never changed in place: color updates and purges build a
/// new message and replace the stored one.
#[derive(Debug, Clone)]
pub struct ChatLog {
    logs: VecDeque<ChatEvent>,
    max_logs: usize,
}

impl ChatLog {
    pub fn new(max_logs: usize) -> Self {
        let max_logs = max_logs.max(1);
        Self {
            logs: VecDeque::with_capacity(max_logs),
            max_logs,
        }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(settings.max_logs)
    }

    /// Append an event, dropping the oldest one when full.
    pub fn push(&mut self, event: ChatEvent) {
        if self.logs.len() >= self.max_logs {
            self.logs.pop_front();
        }
        self.logs.push_back(event);
    }

    pub fn apply(&mut self, event: IrcEvent) {
        match event {
            IrcEvent::Chat(event) => self.push(event),
            IrcEvent::ClearChat => {
                let purged = self.purge_where(|_| true);
                debug!("[ChatLog] Chat cleared, {} messages purged", purged);
            }
            IrcEvent::ClearUser { user_id } => {
                let purged = self.purge_user(&user_id);
                debug!("[ChatLog] Purged {} messages from user {}", purged, user_id);
            }
            IrcEvent::ClearMessage { message_id } => {
                self.purge_message(&message_id);
            }
        }
    }

    /// Replace every message from `user_id` with a copy using `color`.
    /// Returns how many entries were replaced.
    pub fn update_color(&mut self, user_id: &str, color: Option<&str>) -> usize {
        self.replace_messages(
            |event| event.user_id() == Some(user_id),
            |message| message.with_color(color.map(str::to_string)),
        )
    }

    /// Purge every message sent by `user_id` (timeout or ban).
    pub fn purge_user(&mut self, user_id: &str) -> usize {
        self.purge_where(|event| event.user_id() == Some(user_id))
    }

    /// Purge a single message. Returns false if it is no longer in the log.
    pub fn purge_message(&mut self, message_id: &str) -> bool {
        self.purge_where(|event| event.id() == message_id) > 0
    }

    pub fn get(&self, id: &str) -> Option<&ChatEvent> {
        self.logs.iter().find(|event| event.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEvent> {
        self.logs.iter()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Drop everything, e.g. when switching channels
    pub fn clear(&mut self) {
        self.logs.clear();
    }

    pub fn serialize(&self) -> Vec<SerializedChatEvent> {
        self.logs.iter().map(ChatEvent::serialize).collect()
    }

    fn purge_where(&mut self, matches: impl Fn(&ChatEvent) -> bool) -> usize {
        self.replace_messages(
            |event| matches(event) && event.as_message().is_some_and(|m| !m.is_purged()),
            |message| message.purge(),
        )
    }

    fn replace_messages(
        &mut self,
        matches: impl Fn(&ChatEvent) -> bool,
        update: impl Fn(&Message) -> Message,
    ) -> usize {
        let mut replaced = 0;
        for slot in self.logs.iter_mut() {
            if !matches(&*slot) {
                continue;
            }
            if let Some(updated) = slot.map_message(&update) {
                *slot = updated;
                replaced += 1;
            }
        }
        replaced
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::from_settings(&ChatSettings::default())
    }
}
