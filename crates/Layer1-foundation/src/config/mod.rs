//! Config - 통합 설정 관리
//!
//! - `limits.rs` - 캐시 용량 제한
//! - `mirror.rs` - MirrorConfig 통합 설정

mod limits;
mod mirror;

pub use limits::{CacheLimits, DEFAULT_MAX_MESSAGES, DEFAULT_MAX_PRIVATE_CHANNELS};
pub use mirror::{EmitterConfig, MirrorConfig, MIRROR_CONFIG_FILE};
