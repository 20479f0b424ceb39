pub mod badges;
pub mod chat_event;
pub mod chatter;
pub mod emotes;
pub mod message;
pub mod settings;
pub mod userstate;
