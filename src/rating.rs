//! Optimistic rating updates
//!
//! A rating change is applied to the local tip collection before the remote
//! source confirms it. [`PendingRating`] is the token that travels from the
//! optimistic apply to the eventual confirmation or rollback: it holds the
//! pre-mutation snapshot so a failed confirmation can restore the
//! collection exactly.
//!
//! Overlapping confirmations on the same tip are not coalesced and cannot
//! be cancelled. Each pending rating records the store generation it
//! produced; the store uses it to detect (and log) a rollback that discards
//! changes made after the optimistic apply.

use std::sync::Arc;

use crate::leaderboard::rating_reward;
use crate::models::{Tip, TipId};

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Signed rating delta for this vote
    pub fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// An optimistic rating change awaiting confirmation
#[derive(Debug, Clone)]
pub struct PendingRating {
    pub(crate) tip_id: TipId,
    pub(crate) delta: i64,
    pub(crate) author: String,
    pub(crate) snapshot: Arc<Vec<Tip>>,
    pub(crate) applied_generation: u64,
}

impl PendingRating {
    pub fn tip_id(&self) -> TipId {
        self.tip_id
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Username of the tip's author at the time of the vote
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Score change the author receives once the vote is confirmed
    pub fn reward(&self) -> i64 {
        rating_reward(self.delta)
    }

    /// Tip collection as it was before the optimistic apply
    pub fn snapshot(&self) -> &[Tip] {
        &self.snapshot
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }
}

/// Outcome of a rating confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingOutcome {
    /// Remote accepted the change; author rewarded
    Confirmed { tip_id: TipId, author: String, reward: i64 },
    /// Remote rejected the change; collection restored
    RolledBack { tip_id: TipId, message: String },
}
