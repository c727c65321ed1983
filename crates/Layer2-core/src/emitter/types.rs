//! Event emitter types
//!
//! - [`Event`]: a typed event kind bound to one wire name
//! - [`EventListener`]: persistent subscriber for one kind
//! - [`ListenerId`]: handle for removing a listener again

use async_trait::async_trait;
use mirror_foundation::Result;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::state::ConnectionState;

// ============================================================================
// Event
// ============================================================================

/// A typed event kind
///
/// `load` turns the raw payload into the event, updating the entity store
/// on the way. Returning `Ok(None)` means "nothing to report": listeners and
/// waiters are not notified for this dispatch.
#[async_trait]
pub trait Event: Any + Send + Sync + Sized {
    /// Wire name this kind answers to (e.g. `MESSAGE_CREATE`)
    const NAME: &'static str;

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>>;
}

// ============================================================================
// EventListener
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 이벤트 리스너 trait
///
/// Every call runs in its own task; an `Err` or a panic is logged and does
/// not reach the dispatcher or other listeners.
#[async_trait]
pub trait EventListener<E: Event>: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 이벤트 처리
    async fn on_event(&self, event: Arc<E>) -> anyhow::Result<()>;
}

/// Closure adapter used by [`EventEmitter::on`](super::EventEmitter::on)
pub struct FnListener<F> {
    name: String,
    f: F,
}

impl<F> FnListener<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<E, F, Fut> EventListener<E> for FnListener<F>
where
    E: Event,
    F: Fn(Arc<E>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, event: Arc<E>) -> anyhow::Result<()> {
        (self.f)(event).await
    }
}
