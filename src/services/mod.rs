pub mod diagnostic_logger;
pub mod irc_service;
pub mod log_service;
pub mod message_parser;
pub mod settings_service;
