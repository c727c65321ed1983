//! Built-in event 통합 테스트 - store effects of the gateway feed
//!
//! `cargo test -p mirror-core --test events_test`

use async_trait::async_trait;
use mirror_core::events::{
    ChannelCreate, GuildAvailable, GuildCreate, GuildJoin, InteractionCreate, MessageDeleteBulk,
    MessageUpdate, PollVoteAdd, ReactionAdd, ReactionRemove,
};
use mirror_core::{ConnectionState, MirrorConfig};
use mirror_foundation::{
    component_type, CacheLimits, Interaction, Modal, ModalHandler, ModalSubmission, Snowflake, View,
    ViewHandler, ViewItem,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn state() -> Arc<ConnectionState> {
    ConnectionState::new(MirrorConfig::default())
}

fn message(id: u64, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": "500",
        "author": { "id": "42", "username": "ana" },
        "content": content,
    })
}

fn reaction(message_id: u64, user_id: u64, emoji: &str) -> Value {
    json!({
        "user_id": user_id.to_string(),
        "channel_id": "500",
        "message_id": message_id.to_string(),
        "emoji": { "id": null, "name": emoji },
    })
}

async fn ready(state: &Arc<ConnectionState>) {
    state
        .dispatch(
            "READY",
            json!({
                "user": { "id": "100", "username": "mirror-bot", "bot": true },
                "application": { "id": "200" },
                "guilds": [ { "id": "2", "unavailable": true } ],
                "session_id": "abc",
            }),
        )
        .await
        .unwrap();
}

async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for handler")
        .expect("channel closed")
}

// ============================================================================
// Gateway / guilds
// ============================================================================

#[tokio::test]
async fn test_ready_sets_identity() {
    let state = state();
    ready(&state).await;

    assert_eq!(state.user().map(|u| u.id), Some(Snowflake(100)));
    assert_eq!(state.application_id(), Some(Snowflake(200)));
    assert!(state.is_me(Snowflake(100)));
    assert!(state.cache().get_guild(Snowflake(2)).unwrap().unavailable);
}

#[tokio::test]
async fn test_guild_create_new_guild_is_a_join() {
    let state = state();
    let join = state.emitter().wait_for::<GuildJoin>();
    let create = state.emitter().wait_for::<GuildCreate>();

    state
        .dispatch(
            "GUILD_CREATE",
            json!({
                "id": "1",
                "name": "new place",
                "emojis": [ { "id": "11", "name": "blob" } ],
                "stickers": [ { "id": "12", "name": "wave" } ],
            }),
        )
        .await
        .unwrap();

    assert_eq!(join.await.unwrap().guild.id, Snowflake(1));
    assert!(create.await.unwrap().joined);
    assert_eq!(state.emitter().pending_waiters::<GuildAvailable>(), 0);

    let cache = state.cache();
    assert_eq!(cache.get_guild_emojis(Snowflake(1)).len(), 1);
    assert_eq!(
        cache.get_sticker(Snowflake(12)).and_then(|s| s.guild_id),
        Some(Snowflake(1))
    );
}

#[tokio::test]
async fn test_guild_create_for_ready_stub_is_available() {
    let state = state();
    ready(&state).await;

    let available = state.emitter().wait_for::<GuildAvailable>();
    let join = state.emitter().wait_for::<GuildJoin>();

    state
        .dispatch("GUILD_CREATE", json!({ "id": "2", "name": "home" }))
        .await
        .unwrap();

    let event = available.await.unwrap();
    assert_eq!(event.guild.name.as_deref(), Some("home"));
    assert!(!event.guild.unavailable);
    assert_eq!(state.emitter().pending_waiters::<GuildJoin>(), 1);
    drop(join);
}

#[tokio::test]
async fn test_guild_delete_outage_vs_removal() {
    let state = state();
    state
        .dispatch("GUILD_CREATE", json!({ "id": "3", "name": "g" }))
        .await
        .unwrap();

    let outage = state
        .dispatch("GUILD_DELETE", json!({ "id": "3", "unavailable": true }))
        .await
        .unwrap();
    assert_eq!(outage, 0);
    assert!(state.cache().get_guild(Snowflake(3)).unwrap().unavailable);

    let removed = state
        .dispatch("GUILD_DELETE", json!({ "id": "3" }))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(state.cache().get_guild(Snowflake(3)).is_none());
}

#[tokio::test]
async fn test_guild_delete_drops_lists_of_uncached_guild() {
    let state = state();
    state
        .dispatch("GUILD_EMOJIS_UPDATE", json!({ "guild_id": "5", "emojis": [ { "id": "51" } ] }))
        .await
        .unwrap();
    state
        .dispatch(
            "GUILD_STICKERS_UPDATE",
            json!({ "guild_id": "5", "stickers": [ { "id": "52", "name": "wave" } ] }),
        )
        .await
        .unwrap();

    state.dispatch("GUILD_DELETE", json!({ "id": "5" })).await.unwrap();

    let cache = state.cache();
    assert!(cache.get_guild(Snowflake(5)).is_none());
    assert!(cache.get_guild_emojis(Snowflake(5)).is_empty());
    assert!(cache.get_guild_stickers(Snowflake(5)).is_empty());
}

#[tokio::test]
async fn test_guild_emojis_update_replaces_list() {
    let state = state();
    state
        .dispatch(
            "GUILD_CREATE",
            json!({ "id": "4", "emojis": [ { "id": "1" }, { "id": "2" } ] }),
        )
        .await
        .unwrap();

    state
        .dispatch(
            "GUILD_EMOJIS_UPDATE",
            json!({ "guild_id": "4", "emojis": [ { "id": "2", "name": "renamed" }, { "id": "3" } ] }),
        )
        .await
        .unwrap();

    let cache = state.cache();
    let mut ids: Vec<u64> = cache
        .get_guild_emojis(Snowflake(4))
        .iter()
        .map(|e| e.id().get())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(cache.get_emoji(Snowflake(2)).unwrap().name(), Some("renamed"));
}

// ============================================================================
// Channels
// ============================================================================

#[tokio::test]
async fn test_dm_channel_is_indexed_by_peer() {
    let state = state();
    let created = state.emitter().wait_for::<ChannelCreate>();

    state
        .dispatch(
            "CHANNEL_CREATE",
            json!({ "id": "70", "type": 1, "recipients": [ { "id": "71", "username": "peer" } ] }),
        )
        .await
        .unwrap();

    assert_eq!(created.await.unwrap().channel.id(), Snowflake(70));
    let cache = state.cache();
    assert_eq!(
        cache.get_private_channel_by_user(Snowflake(71)).map(|c| c.id()),
        Some(Snowflake(70))
    );
    assert!(cache.get_user(Snowflake(71)).is_some());
}

#[tokio::test]
async fn test_guild_channel_is_not_mirrored() {
    let state = state();

    let delivered = state
        .dispatch("CHANNEL_CREATE", json!({ "id": "80", "type": 0, "guild_id": "1" }))
        .await
        .unwrap();

    assert_eq!(delivered, 0);
    assert_eq!(state.cache().stats().private_channels, 0);
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_message_update_is_copy_on_write() {
    let state = state();
    state.dispatch("MESSAGE_CREATE", message(1, "first")).await.unwrap();
    let original = state.cache().get_message(Snowflake(1)).unwrap();

    let update = state.emitter().wait_for::<MessageUpdate>();
    state
        .dispatch(
            "MESSAGE_UPDATE",
            json!({ "id": "1", "channel_id": "500", "content": "edited" }),
        )
        .await
        .unwrap();

    let event = update.await.unwrap();
    assert_eq!(event.old.as_ref().map(|m| m.content.as_str()), Some("first"));
    assert_eq!(event.message.as_ref().map(|m| m.content.as_str()), Some("edited"));
    assert_eq!(original.content, "first");
    assert_eq!(state.cache().get_message(Snowflake(1)).unwrap().content, "edited");
}

#[tokio::test]
async fn test_message_update_for_uncached_message_keeps_poll() {
    let state = state();

    state
        .dispatch(
            "MESSAGE_UPDATE",
            json!({
                "id": "9",
                "channel_id": "500",
                "poll": {
                    "question": { "text": "?" },
                    "answers": [ { "answer_id": 1, "poll_media": { "text": "yes" } } ]
                }
            }),
        )
        .await
        .unwrap();

    assert!(state.cache().get_message(Snowflake(9)).is_none());
    assert!(state.cache().get_poll(Snowflake(9)).is_some());
}

#[tokio::test]
async fn test_bulk_delete_only_removes_listed_ids() {
    let state = state();
    for id in 1..=3 {
        state.dispatch("MESSAGE_CREATE", message(id, "x")).await.unwrap();
    }
    let bulk = state.emitter().wait_for::<MessageDeleteBulk>();

    state
        .dispatch(
            "MESSAGE_DELETE_BULK",
            json!({ "ids": ["1", "3", "99"], "channel_id": "500" }),
        )
        .await
        .unwrap();

    assert_eq!(bulk.await.unwrap().messages.len(), 2);
    let remaining: Vec<u64> = state
        .cache()
        .get_all_messages()
        .iter()
        .map(|m| m.id.get())
        .collect();
    assert_eq!(remaining, vec![2]);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_add_and_remove() {
    let state = state();
    ready(&state).await;
    state.dispatch("MESSAGE_CREATE", message(1, "hi")).await.unwrap();

    let added = state.emitter().wait_for::<ReactionAdd>();
    state
        .dispatch("MESSAGE_REACTION_ADD", reaction(1, 100, "👍"))
        .await
        .unwrap();
    let added = added.await.unwrap();
    let r = added.reaction.clone().unwrap();
    assert_eq!((r.count, r.me), (1, true));

    let removed = state.emitter().wait_for::<ReactionRemove>();
    state
        .dispatch("MESSAGE_REACTION_REMOVE", reaction(1, 100, "👍"))
        .await
        .unwrap();
    assert_eq!(removed.await.unwrap().reaction.as_ref().map(|r| r.count), Some(0));
    assert!(state.cache().get_message(Snowflake(1)).unwrap().reactions.is_empty());

    // The handle from the add event is a snapshot
    assert_eq!(added.message.as_ref().unwrap().reactions.len(), 1);
}

#[tokio::test]
async fn test_reaction_on_evicted_message_is_a_miss() {
    let config = MirrorConfig::default().with_cache(CacheLimits::default().with_max_messages(Some(1)));
    let state = ConnectionState::new(config);
    state.dispatch("MESSAGE_CREATE", message(1, "old")).await.unwrap();
    state.dispatch("MESSAGE_CREATE", message(2, "new")).await.unwrap();

    let added = state.emitter().wait_for::<ReactionAdd>();
    state
        .dispatch("MESSAGE_REACTION_ADD", reaction(1, 42, "🔥"))
        .await
        .unwrap();

    let event = added.await.unwrap();
    assert!(event.message.is_none());
    assert!(event.reaction.is_none());
    assert_eq!(event.user.as_ref().map(|u| u.id), Some(Snowflake(42)));

    let messages = state.cache().get_all_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].reactions.is_empty());
}

#[tokio::test]
async fn test_remove_emoji_miss_is_suppressed() {
    let state = state();
    state.dispatch("MESSAGE_CREATE", message(1, "hi")).await.unwrap();

    let delivered = state
        .dispatch(
            "MESSAGE_REACTION_REMOVE_EMOJI",
            json!({ "channel_id": "500", "message_id": "1", "emoji": { "name": "x" } }),
        )
        .await
        .unwrap();

    assert_eq!(delivered, 0);
}

// ============================================================================
// Polls
// ============================================================================

#[tokio::test]
async fn test_poll_votes() {
    let state = state();
    let mut payload = message(7, "vote");
    payload["poll"] = json!({
        "question": { "text": "lunch?" },
        "answers": [
            { "answer_id": 1, "poll_media": { "text": "pizza" } },
            { "answer_id": 2, "poll_media": { "text": "salad" } }
        ]
    });
    state.dispatch("MESSAGE_CREATE", payload).await.unwrap();

    let vote = |answer_id: u32| {
        json!({ "user_id": "42", "channel_id": "500", "message_id": "7", "answer_id": answer_id })
    };

    let added = state.emitter().wait_for::<PollVoteAdd>();
    state.dispatch("MESSAGE_POLL_VOTE_ADD", vote(1)).await.unwrap();
    let added = added.await.unwrap();
    assert_eq!(added.answer.id, 1);
    assert_eq!(added.poll.count_for(1), 1);

    state.dispatch("MESSAGE_POLL_VOTE_REMOVE", vote(1)).await.unwrap();
    assert_eq!(state.cache().get_poll(Snowflake(7)).unwrap().count_for(1), 0);

    // Unknown answer and unknown poll are not reported
    assert_eq!(state.dispatch("MESSAGE_POLL_VOTE_ADD", vote(9)).await.unwrap(), 0);
    let mut unknown = vote(1);
    unknown["message_id"] = json!("8");
    assert_eq!(state.dispatch("MESSAGE_POLL_VOTE_ADD", unknown).await.unwrap(), 0);
}

// ============================================================================
// Interactions
// ============================================================================

struct ForwardModal(mpsc::UnboundedSender<ModalSubmission>);

#[async_trait]
impl ModalHandler for ForwardModal {
    async fn on_submit(&self, submission: &ModalSubmission, _interaction: &Interaction) -> anyhow::Result<()> {
        self.0.send(submission.clone())?;
        Ok(())
    }
}

struct ForwardView(mpsc::UnboundedSender<String>);

#[async_trait]
impl ViewHandler for ForwardView {
    async fn on_interaction(&self, item: &ViewItem, _interaction: &Interaction) -> anyhow::Result<()> {
        self.0.send(item.custom_id.clone())?;
        Ok(())
    }
}

#[tokio::test]
async fn test_modal_submit_runs_handler_and_removes_modal() {
    let state = state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state
        .cache_mut()
        .store_modal(Modal::new("feedback", "Feedback", Arc::new(ForwardModal(tx))).with_field("body"));

    let created = state.emitter().wait_for::<InteractionCreate>();
    state
        .dispatch(
            "INTERACTION_CREATE",
            json!({
                "id": "1",
                "application_id": "200",
                "type": 5,
                "data": {
                    "custom_id": "feedback",
                    "components": [ { "type": 1, "components": [
                        { "type": 4, "custom_id": "body", "value": "great" }
                    ] } ]
                }
            }),
        )
        .await
        .unwrap();

    assert_eq!(created.await.unwrap().interaction.custom_id(), Some("feedback"));
    let submission = recv(&mut rx).await;
    assert_eq!(submission.value("body"), Some("great"));

    // removal happens right after the handler returns
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.cache().get_modal("feedback").is_some() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("modal was not removed");
}

struct RejectModal(mpsc::UnboundedSender<String>);

#[async_trait]
impl ModalHandler for RejectModal {
    async fn on_submit(&self, _submission: &ModalSubmission, _interaction: &Interaction) -> anyhow::Result<()> {
        anyhow::bail!("name already taken")
    }

    async fn on_error(&self, error: anyhow::Error, _interaction: &Interaction) {
        let _ = self.0.send(error.to_string());
    }
}

#[tokio::test]
async fn test_failed_modal_submit_keeps_modal() {
    let state = state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state
        .cache_mut()
        .store_modal(Modal::new("rename", "Rename", Arc::new(RejectModal(tx))).with_field("name"));

    state
        .dispatch(
            "INTERACTION_CREATE",
            json!({
                "id": "3",
                "application_id": "200",
                "type": 5,
                "data": {
                    "custom_id": "rename",
                    "components": [ { "type": 1, "components": [
                        { "type": 4, "custom_id": "name", "value": "taken" }
                    ] } ]
                }
            }),
        )
        .await
        .unwrap();

    assert_eq!(recv(&mut rx).await, "name already taken");
    assert!(state.cache().get_modal("rename").is_some());
}

#[tokio::test]
async fn test_component_click_reaches_view() {
    let state = state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let view = View::new(Arc::new(ForwardView(tx))).with_item("confirm", component_type::BUTTON);
    state.cache_mut().store_view(view, Some(Snowflake(1)));

    state
        .dispatch(
            "INTERACTION_CREATE",
            json!({
                "id": "2",
                "application_id": "200",
                "type": 3,
                "message": { "id": "1" },
                "data": { "custom_id": "confirm", "component_type": 2 }
            }),
        )
        .await
        .unwrap();

    assert_eq!(recv(&mut rx).await, "confirm");
}

#[tokio::test]
async fn test_message_delete_drops_its_view() {
    let state = state();
    let (tx, _rx) = mpsc::unbounded_channel();
    state.dispatch("MESSAGE_CREATE", message(1, "menu")).await.unwrap();
    state
        .cache_mut()
        .store_view(View::new(Arc::new(ForwardView(tx))), Some(Snowflake(1)));

    state
        .dispatch("MESSAGE_DELETE", json!({ "id": "1", "channel_id": "500" }))
        .await
        .unwrap();

    let cache = state.cache();
    assert!(cache.get_message(Snowflake(1)).is_none());
    assert!(cache.get_view("1").is_none());
}

#[tokio::test]
async fn test_clear_keeps_views_when_asked() {
    let state = state();
    let (tx, _rx) = mpsc::unbounded_channel();
    ready(&state).await;
    state
        .cache_mut()
        .store_view(View::new(Arc::new(ForwardView(tx))), None);

    state.clear(true);

    assert!(state.user().is_none());
    let stats = state.cache().stats();
    assert_eq!((stats.views, stats.guilds, stats.users), (1, 0, 0));
}
