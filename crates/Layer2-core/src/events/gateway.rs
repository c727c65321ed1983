//! Session lifecycle events

use async_trait::async_trait;
use mirror_foundation::{Guild, Result, Snowflake, User};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::decode;
use crate::emitter::Event;
use crate::state::ConnectionState;

// ============================================================================
// READY
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApplicationRef {
    id: Snowflake,
}

#[derive(Debug, Deserialize)]
struct ReadyPayload {
    user: User,

    #[serde(default)]
    application: Option<ApplicationRef>,

    #[serde(default)]
    guilds: Vec<Guild>,

    #[serde(default)]
    session_id: Option<String>,
}

/// First event of a new session
///
/// Guilds arrive as unavailable stubs; `GUILD_CREATE` fills them in later.
#[derive(Debug, Clone)]
pub struct Ready {
    pub user: Arc<User>,
    pub application_id: Option<Snowflake>,
    pub guilds: Vec<Arc<Guild>>,
    pub session_id: Option<String>,
}

#[async_trait]
impl Event for Ready {
    const NAME: &'static str = "READY";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: ReadyPayload = decode(Self::NAME, data)?;

        let (user, guilds) = {
            let mut cache = state.cache_mut();
            let user = cache.store_user(payload.user);
            let guilds: Vec<Arc<Guild>> = payload.guilds.into_iter().map(|g| cache.add_guild(g)).collect();
            (user, guilds)
        };
        state.set_user(Arc::clone(&user));

        // keep an application id set by the caller
        if state.application_id().is_none() {
            if let Some(application) = &payload.application {
                state.set_application_id(application.id);
            }
        }

        debug!(user_id = %user.id, guilds = guilds.len(), "Session ready");
        Ok(Some(Self {
            user,
            application_id: state.application_id(),
            guilds,
            session_id: payload.session_id,
        }))
    }
}

/// Session resumed after a reconnect
#[derive(Debug, Clone, Copy, Default)]
pub struct Resumed;

#[async_trait]
impl Event for Resumed {
    const NAME: &'static str = "RESUMED";

    async fn load(_data: Value, _state: Arc<ConnectionState>) -> Result<Option<Self>> {
        Ok(Some(Resumed))
    }
}

// ============================================================================
// APPLICATION_COMMAND_PERMISSIONS_UPDATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationCommandPermission {
    /// Role, user or channel the permission applies to
    pub id: Snowflake,

    #[serde(rename = "type")]
    pub kind: u8,

    pub permission: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationCommandPermissionsUpdate {
    /// Command id
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub guild_id: Snowflake,
    #[serde(default)]
    pub permissions: Vec<ApplicationCommandPermission>,
}

#[async_trait]
impl Event for ApplicationCommandPermissionsUpdate {
    const NAME: &'static str = "APPLICATION_COMMAND_PERMISSIONS_UPDATE";

    async fn load(data: Value, _state: Arc<ConnectionState>) -> Result<Option<Self>> {
        decode(Self::NAME, data).map(Some)
    }
}
