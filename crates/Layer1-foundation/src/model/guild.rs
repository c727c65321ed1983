//! Guild model

use serde::{Deserialize, Serialize};

use super::Snowflake;

/// A guild the session is a member of
///
/// `READY` only delivers `{id, unavailable: true}` stubs; the full record
/// arrives later with `GUILD_CREATE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub unavailable: bool,

    #[serde(default)]
    pub owner_id: Option<Snowflake>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub member_count: Option<u64>,

    #[serde(default)]
    pub large: bool,
}

impl Guild {
    pub fn new(id: impl Into<Snowflake>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            unavailable: false,
            owner_id: None,
            icon: None,
            member_count: None,
            large: false,
        }
    }

    /// Placeholder for a guild that is known but currently unavailable
    pub fn unavailable(id: impl Into<Snowflake>) -> Self {
        Self {
            id: id.into(),
            name: None,
            unavailable: true,
            owner_id: None,
            icon: None,
            member_count: None,
            large: false,
        }
    }
}
