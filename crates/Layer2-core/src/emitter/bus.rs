//! Event Emitter - 타입 이벤트 디스패치
//!
//! Raw `(name, payload)` pairs come in; every kind registered under `name`
//! materializes itself with [`Event::load`], then the resulting `Arc<E>` is
//! handed to each listener in a detached task and to every pending waiter.

use futures::future::BoxFuture;
use futures::FutureExt;
use mirror_foundation::{EmitterConfig, Error, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, error, trace, warn};

use super::types::{Event, EventListener, FnListener, ListenerId};
use super::wait::WaitFor;
use crate::state::ConnectionState;

pub(crate) type ErasedEvent = Arc<dyn Any + Send + Sync>;

type LoadFn = fn(Value, Arc<ConnectionState>) -> BoxFuture<'static, Result<Option<ErasedEvent>>>;
type CallFn = Arc<dyn Fn(ErasedEvent) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

fn load_erased<E: Event>(data: Value, state: Arc<ConnectionState>) -> BoxFuture<'static, Result<Option<ErasedEvent>>> {
    async move {
        let event = E::load(data, state).await?;
        Ok(event.map(|e| Arc::new(e) as ErasedEvent))
    }
    .boxed()
}

/// `mirror_core::events::MessageCreate` -> `MessageCreate`
fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Clone)]
struct KindEntry {
    type_id: TypeId,
    kind: &'static str,
    loader: LoadFn,
}

struct ListenerEntry {
    id: ListenerId,
    name: Arc<str>,
    call: CallFn,
}

struct Waiter {
    id: u64,
    sender: oneshot::Sender<ErasedEvent>,
}

#[derive(Default)]
struct Registry {
    /// wire name -> kinds, in registration order
    kinds: HashMap<&'static str, Vec<KindEntry>>,
    listeners: HashMap<TypeId, Vec<ListenerEntry>>,
    waiters: HashMap<TypeId, Vec<Waiter>>,
}

pub(crate) struct EmitterInner {
    config: EmitterConfig,
    registry: Mutex<Registry>,
    semaphore: Option<Arc<Semaphore>>,
    id_counter: AtomicU64,
    dispatch_count: AtomicU64,
}

impl EmitterInner {
    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn remove_waiter(&self, type_id: TypeId, id: u64) {
        let mut registry = self.registry.lock();
        if let Some(waiters) = registry.waiters.get_mut(&type_id) {
            waiters.retain(|w| w.id != id);
            if waiters.is_empty() {
                registry.waiters.remove(&type_id);
            }
        }
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// 이벤트 에미터
///
/// ## 사용법
///
/// ```ignore
/// use mirror_core::{ConnectionState, events::MessageCreate};
///
/// let state = ConnectionState::new(MirrorConfig::default());
///
/// // 리스너 등록
/// let id = state.emitter().on::<MessageCreate, _, _>("log", |event| async move {
///     println!("{}", event.message.content);
///     Ok(())
/// });
///
/// // 다음 이벤트 한 번 대기
/// let next = state.emitter().wait_for::<MessageCreate>();
///
/// // 피드 입력
/// state.dispatch("MESSAGE_CREATE", payload).await?;
/// let event = next.await?;
/// ```
pub struct EventEmitter {
    inner: Arc<EmitterInner>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        let semaphore = config
            .max_concurrent_listeners
            .map(|max| Arc::new(Semaphore::new(max.max(1))));

        Self {
            inner: Arc::new(EmitterInner {
                config,
                registry: Mutex::new(Registry::default()),
                semaphore,
                id_counter: AtomicU64::new(0),
                dispatch_count: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.inner.config
    }

    // ========================================================================
    // Kinds
    // ========================================================================

    /// Register `E` under `E::NAME`; returns false if it already was
    pub fn register_kind<E: Event>(&self) -> bool {
        let mut registry = self.inner.registry.lock();
        let kinds = registry.kinds.entry(E::NAME).or_default();
        if kinds.iter().any(|k| k.type_id == TypeId::of::<E>()) {
            return false;
        }
        kinds.push(KindEntry {
            type_id: TypeId::of::<E>(),
            kind: short_type_name::<E>(),
            loader: load_erased::<E>,
        });
        debug!(event = E::NAME, kind = short_type_name::<E>(), "Registered event kind");
        true
    }

    /// Remove `E` from its name's kind list; other kinds under the same
    /// name keep receiving dispatches
    pub fn unregister_kind<E: Event>(&self) -> bool {
        let mut registry = self.inner.registry.lock();
        let Some(kinds) = registry.kinds.get_mut(E::NAME) else {
            return false;
        };
        let before = kinds.len();
        kinds.retain(|k| k.type_id != TypeId::of::<E>());
        let removed = kinds.len() != before;
        if kinds.is_empty() {
            registry.kinds.remove(E::NAME);
        }
        if removed {
            debug!(event = E::NAME, kind = short_type_name::<E>(), "Unregistered event kind");
        }
        removed
    }

    /// Kind names registered under a wire name, in dispatch order
    pub fn kinds_for(&self, name: &str) -> Vec<&'static str> {
        self.inner
            .registry
            .lock()
            .kinds
            .get(name)
            .map(|kinds| kinds.iter().map(|k| k.kind).collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// 리스너 등록 (registers the kind if needed)
    pub fn add_listener<E, L>(&self, listener: Arc<L>) -> ListenerId
    where
        E: Event,
        L: EventListener<E> + 'static,
    {
        self.register_kind::<E>();

        let id = ListenerId::new(self.inner.next_id());
        let name: Arc<str> = Arc::from(listener.name());
        let call: CallFn = Arc::new(move |event: ErasedEvent| {
            let listener = Arc::clone(&listener);
            async move {
                let event = event
                    .downcast::<E>()
                    .map_err(|_| anyhow::anyhow!("listener received a foreign event"))?;
                listener.on_event(event).await
            }
            .boxed()
        });

        debug!(
            listener_name = %name,
            listener_id = %id,
            event = E::NAME,
            "Registering event listener"
        );

        self.inner
            .registry
            .lock()
            .listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(ListenerEntry { id, name, call });
        id
    }

    /// Closure listener
    pub fn on<E, F, Fut>(&self, name: impl Into<String>, f: F) -> ListenerId
    where
        E: Event,
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_listener::<E, _>(Arc::new(FnListener::new(name, f)))
    }

    /// 리스너 해제
    pub fn remove_listener<E: Event>(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.registry.lock();
        let Some(listeners) = registry.listeners.get_mut(&TypeId::of::<E>()) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            registry.listeners.remove(&TypeId::of::<E>());
        }
        if removed {
            debug!(listener_id = %id, event = E::NAME, "Unregistered event listener");
        }
        removed
    }

    pub fn listener_count<E: Event>(&self) -> usize {
        self.inner
            .registry
            .lock()
            .listeners
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }

    // ========================================================================
    // Waiters
    // ========================================================================

    /// Future for the next `E`; registration happens here, not on first poll
    pub fn wait_for<E: Event>(&self) -> WaitFor<E> {
        self.register_kind::<E>();

        let id = self.inner.next_id();
        let (sender, receiver) = oneshot::channel();
        {
            let mut registry = self.inner.registry.lock();
            let waiters = registry.waiters.entry(TypeId::of::<E>()).or_default();
            waiters.retain(|w| !w.sender.is_closed());
            waiters.push(Waiter { id, sender });
        }
        trace!(event = E::NAME, waiter_id = id, "Waiter registered");

        WaitFor::new(id, receiver, &self.inner)
    }

    /// [`wait_for`](Self::wait_for) with a deadline
    pub fn wait_for_timeout<E: Event>(&self, timeout: Duration) -> impl Future<Output = Result<Arc<E>>> + Send + 'static {
        let waiter = self.wait_for::<E>();
        async move {
            match tokio::time::timeout(timeout, waiter).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(format!("{} not received within {:?}", E::NAME, timeout))),
            }
        }
    }

    pub fn pending_waiters<E: Event>(&self) -> usize {
        self.inner
            .registry
            .lock()
            .waiters
            .get(&TypeId::of::<E>())
            .map(|waiters| waiters.iter().filter(|w| !w.sender.is_closed()).count())
            .unwrap_or(0)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// 총 디스패치 수
    pub fn dispatch_count(&self) -> u64 {
        self.inner.dispatch_count.load(Ordering::SeqCst)
    }

    /// Materialize and fan out one raw event
    ///
    /// Kinds are processed in registration order. A load error stops the
    /// dispatch and is returned as [`Error::Materialize`]; kinds processed
    /// before it have already notified. Returns how many kinds produced an
    /// event.
    ///
    /// Loaders may dispatch secondary names through this method again, so
    /// the future is boxed.
    pub fn dispatch<'a>(&'a self, state: &'a Arc<ConnectionState>, name: &'a str, data: Value) -> BoxFuture<'a, Result<usize>> {
        async move {
            let count = self.inner.dispatch_count.fetch_add(1, Ordering::SeqCst) + 1;

            let kinds: Vec<KindEntry> = self
                .inner
                .registry
                .lock()
                .kinds
                .get(name)
                .cloned()
                .unwrap_or_default();

            if self.inner.config.debug_mode {
                trace!(event = name, kinds = kinds.len(), "Dispatching event #{}", count);
            }

            let mut delivered = 0;
            for kind in kinds {
                let loaded = (kind.loader)(data.clone(), Arc::clone(state))
                    .await
                    .map_err(|e| Error::materialize(kind.kind, e))?;

                match loaded {
                    Some(event) => {
                        self.notify(name, &kind, event);
                        delivered += 1;
                    }
                    None => trace!(event = name, kind = kind.kind, "Event suppressed by loader"),
                }
            }
            Ok(delivered)
        }
        .boxed()
    }

    /// Spawn every listener of the kind, then resolve and clear its waiters
    fn notify(&self, name: &str, kind: &KindEntry, event: ErasedEvent) {
        let (listeners, waiters) = {
            let mut registry = self.inner.registry.lock();
            let listeners: Vec<(ListenerId, Arc<str>, CallFn)> = registry
                .listeners
                .get(&kind.type_id)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|l| (l.id, Arc::clone(&l.name), Arc::clone(&l.call)))
                        .collect()
                })
                .unwrap_or_default();
            let waiters = registry.waiters.remove(&kind.type_id).unwrap_or_default();
            (listeners, waiters)
        };

        for (id, listener_name, call) in listeners {
            trace!(
                listener_id = %id,
                listener_name = %listener_name,
                event = name,
                "Delivering event to listener"
            );
            self.spawn_listener(kind.kind, id, listener_name, call, Arc::clone(&event));
        }

        let mut resolved = 0;
        for waiter in waiters {
            if waiter.sender.send(Arc::clone(&event)).is_ok() {
                resolved += 1;
            }
        }
        if resolved > 0 {
            trace!(event = name, resolved, "Resolved waiters");
        }
    }

    fn spawn_listener(&self, kind: &'static str, id: ListenerId, name: Arc<str>, call: CallFn, event: ErasedEvent) {
        let semaphore = self.inner.semaphore.clone();
        tokio::spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            match AssertUnwindSafe(call(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    listener_id = %id,
                    listener_name = %name,
                    kind,
                    error = %e,
                    "Event listener failed"
                ),
                Err(_) => error!(
                    listener_id = %id,
                    listener_name = %name,
                    kind,
                    "Event listener panicked"
                ),
            }
        });
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.lock();
        f.debug_struct("EventEmitter")
            .field("names", &registry.kinds.len())
            .field("dispatch_count", &self.dispatch_count())
            .finish_non_exhaustive()
    }
}
