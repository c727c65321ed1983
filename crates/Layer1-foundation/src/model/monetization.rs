//! Entitlement model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Snowflake;

/// A premium offering granted to a user or guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: Snowflake,

    pub sku_id: Snowflake,

    pub application_id: Snowflake,

    #[serde(default)]
    pub user_id: Option<Snowflake>,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(rename = "type")]
    pub kind: u8,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub consumed: bool,

    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl Entitlement {
    /// Whether the entitlement is still in effect at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.deleted && self.ends_at.map_or(true, |end| now < end)
    }
}
