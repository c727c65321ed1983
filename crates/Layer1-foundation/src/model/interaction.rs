//! Interaction model
//!
//! Only what the mirror needs to route component clicks and modal
//! submissions back to the registered views/modals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Snowflake, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::Autocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

/// A component value submitted with a modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedComponent {
    #[serde(rename = "type")]
    pub kind: u8,

    #[serde(default)]
    pub custom_id: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(default)]
    pub components: Vec<SubmittedComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub custom_id: Option<String>,

    #[serde(default)]
    pub component_type: Option<u8>,

    /// Command name for application commands
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub components: Vec<ActionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMember {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMessage {
    pub id: Snowflake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Snowflake,

    pub application_id: Snowflake,

    #[serde(rename = "type")]
    pub kind: InteractionType,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub channel_id: Option<Snowflake>,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub member: Option<InteractionMember>,

    #[serde(default)]
    pub message: Option<InteractionMessage>,

    #[serde(default)]
    pub data: Option<InteractionData>,
}

impl Interaction {
    /// Invoking user; guild interactions carry it inside `member`
    pub fn user(&self) -> Option<&User> {
        self.user
            .as_ref()
            .or_else(|| self.member.as_ref().and_then(|m| m.user.as_ref()))
    }

    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.custom_id.as_deref())
    }

    pub fn component_type(&self) -> Option<u8> {
        self.data.as_ref().and_then(|d| d.component_type)
    }

    pub fn message_id(&self) -> Option<Snowflake> {
        self.message.as_ref().map(|m| m.id)
    }

    /// Flattened `custom_id -> value` map of a modal submission
    pub fn submitted_values(&self) -> HashMap<String, String> {
        let Some(data) = &self.data else {
            return HashMap::new();
        };
        data.components
            .iter()
            .flat_map(|row| row.components.iter())
            .filter_map(|c| Some((c.custom_id.clone()?, c.value.clone()?)))
            .collect()
    }
}
