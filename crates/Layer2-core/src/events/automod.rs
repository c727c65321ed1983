//! Auto moderation events

use mirror_foundation::AutoModRule;

passthrough_event!(AutoModRuleCreate, "AUTO_MODERATION_RULE_CREATE", rule: AutoModRule);

passthrough_event!(AutoModRuleUpdate, "AUTO_MODERATION_RULE_UPDATE", rule: AutoModRule);

passthrough_event!(AutoModRuleDelete, "AUTO_MODERATION_RULE_DELETE", rule: AutoModRule);

passthrough_event!(
    /// A rule fired and an action was taken
    AutoModActionExecution,
    "AUTO_MODERATION_ACTION_EXECUTION",
    execution: mirror_foundation::AutoModActionExecution
);
