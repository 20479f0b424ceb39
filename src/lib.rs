//! Message core of the chat overlay.
//!
//! Builds escaped, emote- and badge-annotated chat messages from raw chat
//! payloads and keeps them in a bounded chat log for the UI to render.

pub mod models;
pub mod services;
pub mod utils;

pub use models::badges::{BadgeCatalog, BadgeSelections};
pub use models::chat_event::{ChatEvent, SerializedChatEvent};
pub use models::emotes::{EmoteRange, EmoteRanges};
pub use models::message::{Message, MessageType, SerializedMessage};
pub use models::settings::Settings;
pub use models::userstate::UserState;
pub use services::irc_service::{IrcEvent, IrcService};
pub use services::log_service::ChatLog;
pub use services::message_parser::MessageParser;
