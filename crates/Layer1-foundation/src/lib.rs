//! # mirror-foundation
//!
//! Foundation layer for Mirror:
//! - Error: 공통 에러 타입 (thiserror)
//! - Config: 캐시 용량, emitter 설정 (MirrorConfig, CacheLimits)
//! - Cache: 용량 제한 컨테이너 (LruCache, RingBuffer)
//! - Model: 게이트웨이 엔티티 (User, Guild, Message, Poll, View, Modal...)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  mirror-core                                            │
//! │  ├── EntityStore  ── LruCache / RingBuffer / HashMap    │
//! │  └── EventEmitter ── Event kinds (load → Arc<E>)        │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  mirror-foundation                                      │
//! │  (Error, MirrorConfig, Snowflake + models)              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod model;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    CacheLimits, EmitterConfig, MirrorConfig, DEFAULT_MAX_MESSAGES, DEFAULT_MAX_PRIVATE_CHANNELS,
    MIRROR_CONFIG_FILE,
};

// ============================================================================
// Cache (용량 제한 컨테이너)
// ============================================================================
pub use cache::{LruCache, RingBuffer};

// ============================================================================
// Model (도메인 모델)
// ============================================================================
pub use model::{
    // Ids
    Snowflake,
    // Users & guilds
    Guild,
    User,
    // Emoji & stickers
    AppEmoji,
    Emoji,
    EmojiOwner,
    EmojiPayload,
    GuildEmoji,
    GuildSticker,
    PartialEmoji,
    // Channels
    ChannelPayload,
    PrivateChannel,
    // Messages & polls
    Message,
    MessagePayload,
    MessageUpdatePayload,
    Poll,
    PollAnswer,
    Reaction,
    // Interactions
    component_type,
    Interaction,
    InteractionType,
    Modal,
    ModalHandler,
    ModalSubmission,
    View,
    ViewHandler,
    ViewItem,
    // Misc
    AutoModActionExecution,
    AutoModRule,
    Entitlement,
};
