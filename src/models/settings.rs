use serde::{Deserialize, Serialize};

use crate::services::message_parser::DEFAULT_EMOTE_CDN_URL;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub max_logs: usize,          // Entries kept in the chat log
    pub emote_cdn_url: String,    // Base of emote image URLs, without trailing slash
    pub show_badges: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_logs: 500,
            emote_cdn_url: DEFAULT_EMOTE_CDN_URL.to_string(),
            show_badges: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default = "default_diagnostics_enabled")]
    pub diagnostics_enabled: bool,
}

fn default_diagnostics_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat: ChatSettings::default(),
            diagnostics_enabled: true,
        }
    }
}
