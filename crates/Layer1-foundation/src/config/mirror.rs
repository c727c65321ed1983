//! Mirror Config - 통합 설정
//!
//! 캐시 용량과 이벤트 emitter 설정을 하나로 관리

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::CacheLimits;

/// 설정 파일명
pub const MIRROR_CONFIG_FILE: &str = "mirror.json";

// ============================================================================
// Mirror Config (통합)
// ============================================================================

/// Mirror 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 엔티티 캐시 용량
    #[serde(default)]
    pub cache: CacheLimits,

    /// 이벤트 emitter 설정
    #[serde(default)]
    pub emitter: EmitterConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            cache: CacheLimits::default(),
            emitter: EmitterConfig::default(),
        }
    }
}

impl MirrorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// JSON 파일에서 로드
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// 파일이 없으면 None
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_cache(mut self, cache: CacheLimits) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitter = emitter;
        self
    }
}

// ============================================================================
// Emitter Config
// ============================================================================

/// 이벤트 emitter 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitterConfig {
    /// 디버그 모드 (모든 dispatch 로깅)
    #[serde(default)]
    pub debug_mode: bool,

    /// Upper bound on listener tasks running at once (`None` = unbounded)
    #[serde(default)]
    pub max_concurrent_listeners: Option<usize>,
}

impl EmitterConfig {
    pub fn debug() -> Self {
        Self {
            debug_mode: true,
            ..Default::default()
        }
    }

    pub fn with_max_concurrent_listeners(mut self, max: usize) -> Self {
        self.max_concurrent_listeners = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "cache": {{ "maxPrivateChannels": 8 }}, "emitter": {{ "debugMode": true }} }}"#
        )
        .unwrap();

        let config = MirrorConfig::load(file.path()).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.cache.max_private_channels, 8);
        assert_eq!(config.cache.max_messages, Some(1000));
        assert!(config.emitter.debug_mode);
        assert_eq!(config.emitter.max_concurrent_listeners, None);
    }

    #[test]
    fn test_load_optional_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(MIRROR_CONFIG_FILE);

        assert!(MirrorConfig::load_optional(&missing).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        match MirrorConfig::load(file.path()) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to parse")),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
