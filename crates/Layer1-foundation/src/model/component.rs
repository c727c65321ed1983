//! Views and modals - 인터랙티브 컴포넌트 상태
//!
//! A [`View`] is a persistent tree of message components whose clicks are
//! routed back to a [`ViewHandler`]. A [`Modal`] is a pending form; it is
//! answered once and then dropped from the store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::{Interaction, Snowflake};

/// Component type codes used on the wire
pub mod component_type {
    pub const ACTION_ROW: u8 = 1;
    pub const BUTTON: u8 = 2;
    pub const STRING_SELECT: u8 = 3;
    pub const TEXT_INPUT: u8 = 4;
    pub const USER_SELECT: u8 = 5;
}

// ============================================================================
// View
// ============================================================================

/// Callback side of a view
#[async_trait]
pub trait ViewHandler: Send + Sync {
    /// Called for every interaction that hits one of the view's items
    async fn on_interaction(&self, item: &ViewItem, interaction: &Interaction) -> anyhow::Result<()>;
}

/// A single interactive component inside a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItem {
    pub custom_id: String,
    pub component_type: u8,
}

#[derive(Clone)]
pub struct View {
    pub id: String,
    /// Message the view is attached to, once known
    pub message_id: Option<Snowflake>,
    pub items: Vec<ViewItem>,
    handler: Arc<dyn ViewHandler>,
}

impl View {
    pub fn new(handler: Arc<dyn ViewHandler>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            message_id: None,
            items: Vec::new(),
            handler,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_item(mut self, custom_id: impl Into<String>, component_type: u8) -> Self {
        self.items.push(ViewItem {
            custom_id: custom_id.into(),
            component_type,
        });
        self
    }

    pub fn bound_to(mut self, message_id: impl Into<Snowflake>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Store key: the message id when bound, otherwise the view's own id
    pub fn store_key(&self, message_id: Option<Snowflake>) -> String {
        message_id
            .or(self.message_id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.id.clone())
    }

    /// Item addressed by an interaction, if this view owns it
    pub fn item_for(&self, interaction: &Interaction) -> Option<&ViewItem> {
        if let (Some(bound), Some(target)) = (self.message_id, interaction.message_id()) {
            if bound != target {
                return None;
            }
        }
        let custom_id = interaction.custom_id()?;
        let component_type = interaction.component_type();
        self.items.iter().find(|item| {
            item.custom_id == custom_id
                && component_type.map_or(true, |t| t == item.component_type)
        })
    }

    pub fn handler(&self) -> Arc<dyn ViewHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("message_id", &self.message_id)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Modal
// ============================================================================

/// Callback side of a modal
#[async_trait]
pub trait ModalHandler: Send + Sync {
    async fn on_submit(&self, submission: &ModalSubmission, interaction: &Interaction) -> anyhow::Result<()>;

    /// Called when `on_submit` fails; the modal is still stored at that point
    async fn on_error(&self, error: anyhow::Error, interaction: &Interaction) {
        warn!(interaction_id = %interaction.id, error = %error, "Modal handler failed");
    }
}

/// Values the user typed, restricted to the fields the modal declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSubmission {
    pub custom_id: String,
    pub values: HashMap<String, String>,
}

impl ModalSubmission {
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }
}

#[derive(Clone)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    /// custom ids of the text inputs
    pub fields: Vec<String>,
    handler: Arc<dyn ModalHandler>,
}

impl Modal {
    pub fn new(custom_id: impl Into<String>, title: impl Into<String>, handler: Arc<dyn ModalHandler>) -> Self {
        Self {
            custom_id: custom_id.into(),
            title: title.into(),
            fields: Vec::new(),
            handler,
        }
    }

    pub fn with_field(mut self, custom_id: impl Into<String>) -> Self {
        self.fields.push(custom_id.into());
        self
    }

    pub fn collect(&self, interaction: &Interaction) -> ModalSubmission {
        let mut submitted = interaction.submitted_values();
        let values = self
            .fields
            .iter()
            .filter_map(|field| submitted.remove_entry(field))
            .collect();
        ModalSubmission {
            custom_id: self.custom_id.clone(),
            values,
        }
    }

    pub fn handler(&self) -> Arc<dyn ModalHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("custom_id", &self.custom_id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl ViewHandler for Noop {
        async fn on_interaction(&self, _: &ViewItem, _: &Interaction) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ModalHandler for Noop {
        async fn on_submit(&self, _: &ModalSubmission, _: &Interaction) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn click(custom_id: &str, message_id: &str) -> Interaction {
        serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 3,
            "message": { "id": message_id },
            "data": { "custom_id": custom_id, "component_type": 2 }
        }))
        .unwrap()
    }

    #[test]
    fn test_store_key_prefers_message_id() {
        let view = View::new(Arc::new(Noop)).with_id("abc");
        assert_eq!(view.store_key(None), "abc");
        assert_eq!(view.store_key(Some(Snowflake(9))), "9");
        assert_eq!(view.bound_to(5u64).store_key(None), "5");
    }

    #[test]
    fn test_item_routing() {
        let view = View::new(Arc::new(Noop))
            .with_item("confirm", component_type::BUTTON)
            .bound_to(100u64);

        assert!(view.item_for(&click("confirm", "100")).is_some());
        assert!(view.item_for(&click("confirm", "101")).is_none());
        assert!(view.item_for(&click("cancel", "100")).is_none());
    }

    #[test]
    fn test_modal_collects_declared_fields() {
        let modal = Modal::new("form", "Form", Arc::new(Noop)).with_field("name");
        let interaction: Interaction = serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 5,
            "data": {
                "custom_id": "form",
                "components": [ { "type": 1, "components": [
                    { "type": 4, "custom_id": "name", "value": "Jo" },
                    { "type": 4, "custom_id": "extra", "value": "ignored" }
                ] } ]
            }
        }))
        .unwrap();

        let submission = modal.collect(&interaction);
        assert_eq!(submission.value("name"), Some("Jo"));
        assert_eq!(submission.value("extra"), None);
    }
}
