//! Event Emitter
//!
//! - `types.rs` - Event / EventListener trait, ListenerId
//! - `bus.rs` - EventEmitter (registry, dispatch, fan-out)
//! - `wait.rs` - WaitFor one-shot future

mod bus;
mod types;
mod wait;

pub use bus::EventEmitter;
pub use types::{Event, EventListener, FnListener, ListenerId};
pub use wait::WaitFor;
