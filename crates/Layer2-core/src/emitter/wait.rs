//! One-shot waiters
//!
//! [`WaitFor`] resolves with the next event of its kind. The registry entry
//! lives exactly as long as the future: it is consumed by the dispatch that
//! resolves it, or removed when the future is dropped first.

use mirror_foundation::{Error, Result};
use std::any::TypeId;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::bus::{EmitterInner, ErasedEvent};
use super::types::Event;

/// Future returned by [`EventEmitter::wait_for`](super::EventEmitter::wait_for)
#[must_use = "a waiter is removed as soon as it is dropped"]
pub struct WaitFor<E: Event> {
    id: u64,
    receiver: oneshot::Receiver<ErasedEvent>,
    emitter: Weak<EmitterInner>,
    finished: bool,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Event> WaitFor<E> {
    pub(crate) fn new(id: u64, receiver: oneshot::Receiver<ErasedEvent>, emitter: &Arc<EmitterInner>) -> Self {
        Self {
            id,
            receiver,
            emitter: Arc::downgrade(emitter),
            finished: false,
            _kind: PhantomData,
        }
    }

    /// Waiter id, unique per emitter
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop waiting; same as dropping the future
    pub fn cancel(self) {}
}

impl<E: Event> Future for WaitFor<E> {
    type Output = Result<Arc<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(event)) => {
                this.finished = true;
                let event = event
                    .downcast::<E>()
                    .map_err(|_| Error::Internal(format!("waiter for {} got a foreign event", E::NAME)));
                Poll::Ready(event)
            }
            Poll::Ready(Err(_)) => {
                this.finished = true;
                Poll::Ready(Err(Error::Cancelled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<E: Event> Drop for WaitFor<E> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.remove_waiter(TypeId::of::<E>(), self.id);
        }
    }
}
