use serde::{Deserialize, Serialize};

use crate::models::userstate::UserState;

/// The sender of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chatter {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub color: Option<String>,
    pub is_mod: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SerializedChatter {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub color: Option<String>,
    pub is_mod: bool,
}

impl Chatter {
    pub fn new(userstate: &UserState) -> Self {
        let name = userstate.username.clone().unwrap_or_default();
        // Fall back to the login when the display name tag is empty
        let display_name = userstate
            .display_name
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.clone());

        Self {
            id: userstate.user_id.clone().unwrap_or_default(),
            name,
            display_name,
            color: userstate.color.clone(),
            is_mod: userstate.is_mod || userstate.has_badge("broadcaster"),
        }
    }

    pub fn serialize(&self) -> SerializedChatter {
        SerializedChatter {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            color: self.color.clone(),
            is_mod: self.is_mod,
        }
    }
}
