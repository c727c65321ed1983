//! Poll model
//!
//! Polls are attached to messages and keyed by message id in the store.
//! Vote events adjust `results` on a copy which is then written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PartialEmoji;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollMedia {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub emoji: Option<PartialEmoji>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAnswer {
    #[serde(rename = "answer_id")]
    pub id: u32,

    pub poll_media: PollMedia,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAnswerCount {
    pub id: u32,
    pub count: u32,
    #[serde(default)]
    pub me_voted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResults {
    #[serde(default)]
    pub is_finalized: bool,

    #[serde(default)]
    pub answer_counts: Vec<PollAnswerCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: PollMedia,

    pub answers: Vec<PollAnswer>,

    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default)]
    pub allow_multiselect: bool,

    #[serde(default)]
    pub results: Option<PollResults>,
}

impl Poll {
    pub fn get_answer(&self, answer_id: u32) -> Option<&PollAnswer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }

    /// Current vote count for an answer (0 when no results were reported)
    pub fn count_for(&self, answer_id: u32) -> u32 {
        self.results
            .as_ref()
            .and_then(|r| r.answer_counts.iter().find(|c| c.id == answer_id))
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Record a vote; returns false when the answer does not exist
    pub fn add_vote(&mut self, answer_id: u32, by_me: bool) -> bool {
        if self.get_answer(answer_id).is_none() {
            return false;
        }
        let results = self.results.get_or_insert_with(PollResults::default);
        match results.answer_counts.iter_mut().find(|c| c.id == answer_id) {
            Some(count) => {
                count.count += 1;
                count.me_voted |= by_me;
            }
            None => results.answer_counts.push(PollAnswerCount {
                id: answer_id,
                count: 1,
                me_voted: by_me,
            }),
        }
        true
    }

    /// Withdraw a vote; returns false when the answer does not exist
    pub fn remove_vote(&mut self, answer_id: u32, by_me: bool) -> bool {
        if self.get_answer(answer_id).is_none() {
            return false;
        }
        if let Some(count) = self
            .results
            .as_mut()
            .and_then(|r| r.answer_counts.iter_mut().find(|c| c.id == answer_id))
        {
            count.count = count.count.saturating_sub(1);
            if by_me {
                count.me_voted = false;
            }
        }
        true
    }
}
