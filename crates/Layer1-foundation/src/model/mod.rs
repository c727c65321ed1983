//! Domain models mirrored from the gateway
//!
//! Payload structs (`*Payload`) match the wire shape; the cached types hold
//! resolved references (`Arc<User>`) where the store deduplicates them.

mod automod;
mod channel;
mod component;
mod emoji;
mod guild;
mod interaction;
mod message;
mod monetization;
mod poll;
mod snowflake;
mod sticker;
mod user;

pub use automod::{
    AutoModAction, AutoModActionExecution, AutoModActionMetadata, AutoModRule,
    AutoModTriggerMetadata,
};
pub use channel::{channel_type, ChannelPayload, DmChannel, GroupChannel, PrivateChannel};
pub use component::{
    component_type, Modal, ModalHandler, ModalSubmission, View, ViewHandler, ViewItem,
};
pub use emoji::{AppEmoji, Emoji, EmojiOwner, EmojiPayload, GuildEmoji, PartialEmoji};
pub use guild::Guild;
pub use interaction::{
    ActionRow, Interaction, InteractionData, InteractionMember, InteractionMessage,
    InteractionType, SubmittedComponent,
};
pub use message::{Message, MessagePayload, MessageUpdatePayload, Reaction};
pub use monetization::Entitlement;
pub use poll::{Poll, PollAnswer, PollAnswerCount, PollMedia, PollResults};
pub use snowflake::{Snowflake, DISCORD_EPOCH_MS};
pub use sticker::GuildSticker;
pub use user::{User, UNCACHED_DISCRIMINATOR};
