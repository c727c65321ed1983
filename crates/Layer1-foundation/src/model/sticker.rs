//! Sticker model

use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Sticker uploaded to a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSticker {
    pub id: Snowflake,

    pub name: String,

    /// Filled in from the owning guild when the payload omits it
    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub description: Option<String>,

    /// Autocomplete tags, comma separated on the wire
    #[serde(default)]
    pub tags: String,

    #[serde(default = "default_format")]
    pub format_type: u8,

    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_format() -> u8 {
    1
}
fn default_true() -> bool {
    true
}

impl GuildSticker {
    pub fn new(id: impl Into<Snowflake>, guild_id: impl Into<Snowflake>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            guild_id: Some(guild_id.into()),
            description: None,
            tags: String::new(),
            format_type: default_format(),
            available: true,
        }
    }
}
