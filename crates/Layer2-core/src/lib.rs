//! mirror-core: Gateway state mirror
//!
//! Layer2 - 엔티티 캐시 + 이벤트 디스패치 레이어
//!
//! # 주요 모듈
//!
//! - `store`: EntityStore (users, guilds, emojis, stickers, polls, private
//!   channels, messages, views, modals)
//! - `emitter`: EventEmitter (typed event kinds, listeners, one-shot waiters)
//! - `state`: ConnectionState (store + emitter + session identity)
//! - `events`: built-in gateway event kinds
//!
//! # 사용 예시
//!
//! ```ignore
//! use mirror_core::{ConnectionState, events::ReactionAdd};
//! use mirror_foundation::MirrorConfig;
//!
//! let state = ConnectionState::new(MirrorConfig::default());
//!
//! state.emitter().on::<ReactionAdd, _, _>("audit", |event| async move {
//!     tracing::info!(message_id = %event.message_id, "reaction");
//!     Ok(())
//! });
//!
//! for (name, payload) in feed {
//!     state.dispatch(&name, payload).await?;
//! }
//!
//! let stats = state.cache().stats();
//! ```

pub mod emitter;
pub mod events;
pub mod state;
pub mod store;

// Re-exports: Emitter
pub use emitter::{Event, EventEmitter, EventListener, FnListener, ListenerId, WaitFor};

// Re-exports: State / Store
pub use state::ConnectionState;
pub use store::{EntityStore, StoreStats};

// Re-exports: foundation
pub use mirror_foundation::{Error, MirrorConfig, Result};
