//! Channel events
//!
//! Only private channels are mirrored; guild channel events are decoded and
//! then dropped.

use async_trait::async_trait;
use mirror_foundation::{ChannelPayload, PrivateChannel, Result, User};
use serde_json::Value;
use std::sync::Arc;

use super::decode;
use crate::emitter::Event;
use crate::state::ConnectionState;

/// A DM or group DM was opened
#[derive(Debug, Clone)]
pub struct ChannelCreate {
    pub channel: Arc<PrivateChannel>,
}

#[async_trait]
impl Event for ChannelCreate {
    const NAME: &'static str = "CHANNEL_CREATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: ChannelPayload = decode(Self::NAME, data)?;
        if !payload.is_private() {
            return Ok(None);
        }

        let mut cache = state.cache_mut();
        let recipients: Vec<Arc<User>> = payload
            .recipients
            .iter()
            .cloned()
            .map(|user| cache.store_user(user))
            .collect();

        Ok(PrivateChannel::from_payload(&payload, recipients).map(|channel| Self {
            channel: cache.store_private_channel(channel),
        }))
    }
}
