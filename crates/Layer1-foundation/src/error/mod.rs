//! Error types for Mirror
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Mirror 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 이벤트 관련
    // ========================================================================
    /// Payload could not be decoded into the shape an event kind expects
    #[error("Invalid payload for {event}: {message}")]
    InvalidPayload { event: String, message: String },

    /// An event kind's load routine failed; the store may be partially updated
    #[error("Failed to materialize {kind}: {source}")]
    Materialize {
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Payload 디코딩 에러 생성 헬퍼
    pub fn payload(event: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::InvalidPayload {
            event: event.into(),
            message: message.to_string(),
        }
    }

    /// Materialize 에러 생성 헬퍼
    pub fn materialize(kind: &'static str, source: Error) -> Self {
        Error::Materialize {
            kind,
            source: Box::new(source),
        }
    }

    /// 대기 중이던 작업이 취소/시간초과로 끝났는지 확인
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Cancelled | Error::Timeout(_))
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
