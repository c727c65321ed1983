//! User model

use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Discriminator the gateway reports for accounts that were never migrated
/// to unique usernames; such users are never cached
pub const UNCACHED_DISCRIMINATOR: &str = "0000";

/// A user as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,

    pub username: String,

    #[serde(default = "default_discriminator")]
    pub discriminator: String,

    #[serde(default)]
    pub global_name: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub bot: bool,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl User {
    pub fn new(id: impl Into<Snowflake>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            discriminator: default_discriminator(),
            global_name: None,
            avatar: None,
            bot: false,
        }
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = discriminator.into();
        self
    }

    /// Whether the entity store is allowed to keep this user
    pub fn is_cacheable(&self) -> bool {
        self.discriminator != UNCACHED_DISCRIMINATOR
    }

    /// 표시용 이름
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_minimal() {
        let user: User = serde_json::from_value(json!({
            "id": "80351110224678912",
            "username": "nelly",
        }))
        .unwrap();

        assert_eq!(user.id, Snowflake(80351110224678912));
        assert_eq!(user.discriminator, "0");
        assert!(user.is_cacheable());
        assert_eq!(user.display_name(), "nelly");
    }

    #[test]
    fn test_migration_marker_not_cacheable() {
        let user = User::new(1u64, "legacy").with_discriminator("0000");
        assert!(!user.is_cacheable());
    }
}
