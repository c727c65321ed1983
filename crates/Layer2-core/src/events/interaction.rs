//! Interaction routing
//!
//! Component clicks go to every stored view that owns the clicked item;
//! modal submissions go to the stored modal with the same custom id, which
//! is removed once its handler succeeds. Handlers run in their own tasks so
//! a slow callback never holds up the feed.

use async_trait::async_trait;
use mirror_foundation::{Interaction, InteractionType, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::decode;
use crate::emitter::Event;
use crate::state::ConnectionState;

#[derive(Debug, Clone)]
pub struct InteractionCreate {
    pub interaction: Arc<Interaction>,
}

#[async_trait]
impl Event for InteractionCreate {
    const NAME: &'static str = "INTERACTION_CREATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let interaction: Arc<Interaction> = Arc::new(decode(Self::NAME, data)?);

        match interaction.kind {
            InteractionType::MessageComponent => route_component(&state, &interaction),
            InteractionType::ModalSubmit => route_modal(&state, &interaction),
            _ => {}
        }

        Ok(Some(Self { interaction }))
    }
}

fn route_component(state: &ConnectionState, interaction: &Arc<Interaction>) {
    let views = state.cache().get_all_views();

    for view in views {
        let Some(item) = view.item_for(interaction).cloned() else {
            continue;
        };
        debug!(view_id = %view.id, custom_id = %item.custom_id, "Routing component interaction");

        let handler = view.handler();
        let interaction = Arc::clone(interaction);
        tokio::spawn(async move {
            if let Err(e) = handler.on_interaction(&item, &interaction).await {
                warn!(custom_id = %item.custom_id, error = %e, "View handler failed");
            }
        });
    }
}

/// A failed submit leaves the modal stored so the user can send it again
fn route_modal(state: &Arc<ConnectionState>, interaction: &Arc<Interaction>) {
    let Some(custom_id) = interaction.custom_id() else {
        return;
    };
    let Some(modal) = state.cache().get_modal(custom_id) else {
        debug!(custom_id, "Modal submission for unknown modal");
        return;
    };

    let submission = modal.collect(interaction);
    let handler = modal.handler();
    let state = Arc::clone(state);
    let interaction = Arc::clone(interaction);
    tokio::spawn(async move {
        match handler.on_submit(&submission, &interaction).await {
            Ok(()) => {
                state.cache_mut().delete_modal(&submission.custom_id);
            }
            Err(e) => handler.on_error(e, &interaction).await,
        }
    });
}
