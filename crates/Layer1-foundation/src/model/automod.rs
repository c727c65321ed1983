//! Auto moderation models

use serde::{Deserialize, Serialize};

use super::Snowflake;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoModTriggerMetadata {
    #[serde(default)]
    pub keyword_filter: Vec<String>,

    #[serde(default)]
    pub regex_patterns: Vec<String>,

    #[serde(default)]
    pub presets: Vec<u8>,

    #[serde(default)]
    pub allow_list: Vec<String>,

    #[serde(default)]
    pub mention_total_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoModActionMetadata {
    #[serde(default)]
    pub channel_id: Option<Snowflake>,

    #[serde(default)]
    pub duration_seconds: Option<u64>,

    #[serde(default)]
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoModAction {
    #[serde(rename = "type")]
    pub kind: u8,

    #[serde(default)]
    pub metadata: AutoModActionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoModRule {
    pub id: Snowflake,

    pub guild_id: Snowflake,

    pub name: String,

    pub creator_id: Snowflake,

    pub event_type: u8,

    pub trigger_type: u8,

    #[serde(default)]
    pub trigger_metadata: AutoModTriggerMetadata,

    #[serde(default)]
    pub actions: Vec<AutoModAction>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub exempt_roles: Vec<Snowflake>,

    #[serde(default)]
    pub exempt_channels: Vec<Snowflake>,
}

/// Body of `AUTO_MODERATION_ACTION_EXECUTION`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoModActionExecution {
    pub guild_id: Snowflake,

    pub action: AutoModAction,

    pub rule_id: Snowflake,

    pub rule_trigger_type: u8,

    pub user_id: Snowflake,

    #[serde(default)]
    pub channel_id: Option<Snowflake>,

    #[serde(default)]
    pub message_id: Option<Snowflake>,

    #[serde(default)]
    pub alert_system_message_id: Option<Snowflake>,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub matched_keyword: Option<String>,

    #[serde(default)]
    pub matched_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_rule() {
        let rule: AutoModRule = serde_json::from_value(json!({
            "id": "1",
            "guild_id": "2",
            "name": "no spam",
            "creator_id": "3",
            "event_type": 1,
            "trigger_type": 1,
            "trigger_metadata": { "keyword_filter": ["spam"] },
            "actions": [ { "type": 1 } ],
            "enabled": true,
            "exempt_roles": ["4"],
            "exempt_channels": []
        }))
        .unwrap();

        assert_eq!(rule.trigger_metadata.keyword_filter, vec!["spam"]);
        assert_eq!(rule.actions[0].metadata, AutoModActionMetadata::default());
        assert_eq!(rule.exempt_roles, vec![Snowflake(4)]);
    }
}
