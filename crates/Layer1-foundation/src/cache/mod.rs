//! # Bounded containers
//!
//! Capacity-aware building blocks used by the entity store:
//!
//! - [`LruCache`] - least-recently-used map that reports evictions
//! - [`RingBuffer`] - FIFO buffer with an optional maximum length

mod lru;
mod ring;

pub use lru::LruCache;
pub use ring::RingBuffer;
