//! In-memory tip state
//!
//! [`TipStore`] holds the tip collection as an immutable shared snapshot
//! that is replaced wholesale on every mutation, the leaderboard derived
//! from it, the active tip selection and the current error banner. Every
//! replacement bumps a generation counter and recomputes the leaderboard.

use std::sync::Arc;

use crate::error::{FairfareError, Result};
use crate::leaderboard::Leaderboard;
use crate::models::{Tip, TipId, User};
use crate::rating::PendingRating;

/// Client-side state for the tip list and everything derived from it
#[derive(Debug, Clone, Default)]
pub struct TipStore {
    tips: Arc<Vec<Tip>>,
    leaderboard: Leaderboard,
    active_tip: Option<TipId>,
    error: Option<String>,
    generation: u64,
}

impl TipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `tips`
    pub fn with_tips(tips: Vec<Tip>) -> Self {
        let mut store = Self::new();
        store.load(tips);
        store
    }

    /// Replace the whole collection (initial fetch)
    pub fn load(&mut self, tips: Vec<Tip>) {
        tracing::debug!(count = tips.len(), "Loading tip collection");
        self.replace(Arc::new(tips));
    }

    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<Vec<Tip>> {
        Arc::clone(&self.tips)
    }

    pub fn get(&self, tip_id: TipId) -> Option<&Tip> {
        self.tips.iter().find(|t| t.id == tip_id)
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    /// Ranked users
    pub fn users(&self) -> &[User] {
        self.leaderboard.users()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Number of snapshot replacements so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn replace(&mut self, tips: Arc<Vec<Tip>>) {
        self.tips = tips;
        self.generation += 1;
        self.leaderboard.recompute(&self.tips);
    }

    fn prepend(&mut self, tip: Tip) {
        let mut next = Vec::with_capacity(self.tips.len() + 1);
        next.push(tip);
        next.extend(self.tips.iter().cloned());
        self.replace(Arc::new(next));
    }

    /// Insert a tip this instance just created at the head of the list.
    ///
    /// A tip whose id is already present is ignored.
    pub fn insert_created(&mut self, tip: Tip) -> bool {
        if self.get(tip.id).is_some() {
            tracing::warn!(tip_id = tip.id, "Created tip already present, ignoring");
            return false;
        }
        self.prepend(tip);
        true
    }

    /// Merge a tip received over the broadcast channel.
    ///
    /// Idempotent by identifier: returns `false` and leaves the collection
    /// untouched when a tip with the same id already exists.
    pub fn merge_broadcast(&mut self, tip: Tip) -> bool {
        if self.get(tip.id).is_some() {
            tracing::debug!(tip_id = tip.id, "Broadcast tip already known");
            return false;
        }
        tracing::info!(tip_id = tip.id, origin = %tip.origin, "Merged broadcast tip");
        self.prepend(tip);
        true
    }

    /// Apply a rating change optimistically.
    ///
    /// The returned [`PendingRating`] must later be passed to
    /// [`commit_rating`](Self::commit_rating) or
    /// [`rollback_rating`](Self::rollback_rating).
    ///
    /// # Errors
    ///
    /// Returns [`FairfareError::NotFound`] for an unknown tip and
    /// [`FairfareError::Validation`] for a zero delta; the store is left
    /// untouched in both cases.
    pub fn begin_rating(&mut self, tip_id: TipId, delta: i64) -> Result<PendingRating> {
        if delta == 0 {
            return Err(
                FairfareError::Validation("rating change cannot be zero".to_string()).into(),
            );
        }

        let author = self
            .get(tip_id)
            .map(|t| t.user.username.clone())
            .ok_or_else(|| FairfareError::NotFound(format!("tip {}", tip_id)))?;

        let snapshot = self.snapshot();
        let updated: Vec<Tip> = snapshot
            .iter()
            .map(|t| {
                if t.id == tip_id {
                    Tip {
                        rating: t.rating + delta,
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect();
        self.replace(Arc::new(updated));

        tracing::debug!(tip_id, delta, generation = self.generation, "Applied optimistic rating");

        Ok(PendingRating {
            tip_id,
            delta,
            author,
            snapshot,
            applied_generation: self.generation,
        })
    }

    /// Confirm a pending rating: the author earns the reward or penalty.
    pub fn commit_rating(&mut self, pending: &PendingRating) {
        let reward = pending.reward();
        if !self.leaderboard.reward(&pending.author, reward) {
            tracing::warn!(
                author = %pending.author,
                "Rated tip's author is no longer on the leaderboard"
            );
        }
        tracing::info!(
            tip_id = pending.tip_id,
            author = %pending.author,
            reward,
            "Rating confirmed"
        );
    }

    /// Discard the optimistic collection and restore the pre-vote snapshot.
    ///
    /// Changes made after the optimistic apply (other votes, merged
    /// broadcasts) are discarded too; this is logged.
    pub fn rollback_rating(&mut self, pending: PendingRating) {
        if self.generation != pending.applied_generation {
            tracing::warn!(
                tip_id = pending.tip_id,
                applied_generation = pending.applied_generation,
                current_generation = self.generation,
                "Rolling back a superseded rating; later changes are discarded"
            );
        }
        self.replace(pending.snapshot);
        tracing::info!(tip_id = pending.tip_id, "Rating rolled back");
    }

    /// Tips matching `term` in origin, destination or advice.
    ///
    /// Matching is case-insensitive; a blank term matches everything.
    pub fn filter(&self, term: &str) -> Vec<&Tip> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.tips.iter().collect();
        }
        self.tips
            .iter()
            .filter(|t| t.matches_lowercase(&needle))
            .collect()
    }

    /// Mark a tip as active (marker activation or hover).
    ///
    /// Returns the tip's position in the collection. Unknown ids clear the
    /// selection.
    pub fn select(&mut self, tip_id: TipId) -> Option<usize> {
        let index = self.tips.iter().position(|t| t.id == tip_id);
        self.active_tip = index.map(|_| tip_id);
        index
    }

    pub fn clear_selection(&mut self) {
        self.active_tip = None;
    }

    pub fn active_tip(&self) -> Option<TipId> {
        self.active_tip
    }

    /// Set the user-visible error banner
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
