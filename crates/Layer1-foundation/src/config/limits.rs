//! Cache Limits - 엔티티 캐시 용량 설정
//!
//! 메시지 링 버퍼와 private channel LRU의 크기를 정합니다.

use serde::{Deserialize, Serialize};

/// Default number of messages kept in the ring buffer
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

/// Default number of private channels kept before LRU eviction
pub const DEFAULT_MAX_PRIVATE_CHANNELS: usize = 128;

/// Capacity policy for the bounded entity collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheLimits {
    /// Maximum messages in the ring buffer (`None` = unbounded)
    #[serde(default = "default_max_messages")]
    pub max_messages: Option<usize>,

    /// Maximum private channels before the least recently used one is evicted
    #[serde(default = "default_max_private_channels")]
    pub max_private_channels: usize,
}

fn default_max_messages() -> Option<usize> {
    Some(DEFAULT_MAX_MESSAGES)
}
fn default_max_private_channels() -> usize {
    DEFAULT_MAX_PRIVATE_CHANNELS
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            max_private_channels: default_max_private_channels(),
        }
    }
}

impl CacheLimits {
    /// Message buffer without eviction
    pub fn unbounded() -> Self {
        Self {
            max_messages: None,
            ..Default::default()
        }
    }

    /// Small limits for resource-constrained environments
    pub fn minimal() -> Self {
        Self {
            max_messages: Some(100),
            max_private_channels: 32,
        }
    }

    pub fn with_max_messages(mut self, max_messages: Option<usize>) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_max_private_channels(mut self, max: usize) -> Self {
        self.max_private_channels = max;
        self
    }
}
