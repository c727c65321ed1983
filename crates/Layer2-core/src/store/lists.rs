//! Per-owner entity lists
//!
//! Emojis and stickers are filed under their owner (guild or application).
//! Each list holds at most one entry per id; storing an id again replaces
//! the entry in place.

use mirror_foundation::{Emoji, EmojiOwner, GuildSticker, Snowflake};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Something with a stable id and a well-defined owner list
pub trait Owned {
    type Owner: Copy + Eq + Hash + fmt::Debug;

    fn id(&self) -> Snowflake;
    fn owner(&self) -> Self::Owner;
}

impl Owned for Emoji {
    type Owner = EmojiOwner;

    fn id(&self) -> Snowflake {
        Emoji::id(self)
    }

    fn owner(&self) -> EmojiOwner {
        Emoji::owner(self)
    }
}

impl Owned for GuildSticker {
    /// guild id; stickers without a guild are filed under `Snowflake(0)`
    type Owner = Snowflake;

    fn id(&self) -> Snowflake {
        self.id
    }

    fn owner(&self) -> Snowflake {
        self.guild_id.unwrap_or_default()
    }
}

#[derive(Debug)]
pub(crate) struct OwnerLists<T: Owned> {
    lists: HashMap<T::Owner, Vec<Arc<T>>>,
}

impl<T: Owned> OwnerLists<T> {
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    pub fn store(&mut self, item: T) -> Arc<T> {
        let item = Arc::new(item);
        let list = self.lists.entry(item.owner()).or_default();
        match list.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => list[index] = Arc::clone(&item),
            None => list.push(Arc::clone(&item)),
        }
        item
    }

    pub fn get(&self, id: Snowflake) -> Option<Arc<T>> {
        self.lists
            .values()
            .flat_map(|list| list.iter())
            .find(|item| item.id() == id)
            .cloned()
    }

    pub fn for_owner(&self, owner: T::Owner) -> Vec<Arc<T>> {
        self.lists.get(&owner).cloned().unwrap_or_default()
    }

    pub fn all(&self) -> Vec<Arc<T>> {
        self.lists.values().flat_map(|list| list.iter().cloned()).collect()
    }

    /// Remove by id from one owner's list only
    pub fn remove_from(&mut self, owner: T::Owner, id: Snowflake) -> Option<Arc<T>> {
        let list = self.lists.get_mut(&owner)?;
        let index = list.iter().position(|item| item.id() == id)?;
        let removed = list.remove(index);
        if list.is_empty() {
            self.lists.remove(&owner);
        }
        Some(removed)
    }

    /// Remove by id, wherever it is filed
    pub fn remove(&mut self, id: Snowflake) -> Option<Arc<T>> {
        let owner = self
            .lists
            .iter()
            .find(|(_, list)| list.iter().any(|item| item.id() == id))
            .map(|(owner, _)| *owner)?;
        self.remove_from(owner, id)
    }

    pub fn drop_owner(&mut self, owner: T::Owner) -> usize {
        self.lists.remove(&owner).map(|list| list.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }
}
