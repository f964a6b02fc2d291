//! Leaderboard aggregation
//!
//! The leaderboard is derived from the tip collection: every tip carries a
//! snapshot of its author, and a user's score is the sum of those snapshot
//! scores across all of their tips. [`aggregate`] is the pure form of that
//! derivation. [`Leaderboard`] is the ledger the store keeps across
//! recomputations: it remembers the order in which usernames were first
//! registered (the tie-break) and the rewards earned from confirmed ratings,
//! which are layered on top of every wholesale recompute.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Tip, User};

/// Score change for the author of a tip whose rating change was confirmed
pub const UPVOTE_REWARD: i64 = 5;
/// Score change for the author of a tip whose downvote was confirmed
pub const DOWNVOTE_PENALTY: i64 = -2;

/// Number of entries the leaderboard panel shows
pub const PODIUM_SIZE: usize = 5;

/// Reward for the author given a rating delta
pub fn rating_reward(delta: i64) -> i64 {
    if delta > 0 {
        UPVOTE_REWARD
    } else {
        DOWNVOTE_PENALTY
    }
}

/// Group tips by author, summing scores, in first-appearance order.
fn group_by_author(tips: &[Tip]) -> Vec<User> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut users: Vec<User> = Vec::new();

    for tip in tips {
        match index.get(tip.user.username.as_str()) {
            Some(&i) => {
                let user = &mut users[i];
                user.score += tip.user.score;
                for badge in &tip.user.badges {
                    if !user.badges.contains(badge) {
                        user.badges.push(badge.clone());
                    }
                }
            }
            None => {
                index.insert(tip.user.username.as_str(), users.len());
                let mut user = tip.user.clone();
                let mut seen = Vec::with_capacity(user.badges.len());
                user.badges.retain(|b| {
                    if seen.contains(b) {
                        false
                    } else {
                        seen.push(b.clone());
                        true
                    }
                });
                users.push(user);
            }
        }
    }

    users
}

/// Rank users by summed author score, descending.
///
/// Ties keep first-appearance order in `tips`.
///
/// # Examples
///
/// ```
/// use fairfare::leaderboard::aggregate;
/// use fairfare::remote::mock::seed_tips;
///
/// let users = aggregate(&seed_tips());
/// assert_eq!(users[0].username, "MetroManMohan");
/// assert_eq!(users[0].score, 180);
/// ```
pub fn aggregate(tips: &[Tip]) -> Vec<User> {
    let mut users = group_by_author(tips);
    users.sort_by_key(|u| Reverse(u.score));
    users
}

/// Display label for a 0-based rank
pub fn podium(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => format!("{}.", n + 1),
    }
}

/// Ranked user list maintained across tip-list changes
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    registration: HashMap<String, u64>,
    next_registration: u64,
    rewards: HashMap<String, i64>,
    ranked: Vec<User>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the ranking from the full tip collection.
    pub fn recompute(&mut self, tips: &[Tip]) -> &[User] {
        let mut users = group_by_author(tips);
        for user in &mut users {
            if !self.registration.contains_key(&user.username) {
                self.registration
                    .insert(user.username.clone(), self.next_registration);
                self.next_registration += 1;
            }
            if let Some(reward) = self.rewards.get(&user.username) {
                user.score += reward;
            }
        }
        self.ranked = users;
        self.sort();
        &self.ranked
    }

    /// Apply a confirmed rating reward to `username` and re-rank.
    ///
    /// Returns `false` when the user is not on the board; the reward is
    /// still recorded and shows up once they are.
    pub fn reward(&mut self, username: &str, points: i64) -> bool {
        *self.rewards.entry(username.to_string()).or_insert(0) += points;

        let Some(user) = self.ranked.iter_mut().find(|u| u.username == username) else {
            return false;
        };
        user.score += points;
        self.sort();
        true
    }

    pub fn users(&self) -> &[User] {
        &self.ranked
    }

    /// The first `n` ranked users
    pub fn top(&self, n: usize) -> &[User] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// Score of `username`, if ranked
    pub fn score_of(&self, username: &str) -> Option<i64> {
        self.ranked
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.score)
    }

    // Descending score, then earliest registration.
    fn sort(&mut self) {
        let registration = &self.registration;
        self.ranked.sort_by_key(|u| {
            (
                Reverse(u.score),
                registration.get(&u.username).copied().unwrap_or(u64::MAX),
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransportMode;

    fn tip(id: i64, username: &str, score: i64, badges: &[&str]) -> Tip {
        Tip {
            id,
            origin: format!("origin {}", id),
            destination: format!("destination {}", id),
            transport_mode: TransportMode::Bus,
            estimated_cost: "₹20".to_string(),
            estimated_time: "10 minutes".to_string(),
            advice: "advice".to_string(),
            user: User::new(username, score, badges),
            rating: 0,
            coordinates: None,
        }
    }

    #[test]
    fn test_aggregate_sums_scores_per_author() {
        let tips = vec![
            tip(1, "A", 10, &["Metro Master"]),
            tip(2, "B", 30, &[]),
            tip(3, "A", 25, &["Top Contributor"]),
        ];
        let users = aggregate(&tips);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "A");
        assert_eq!(users[0].score, 35);
        assert_eq!(users[0].badges, vec!["Metro Master", "Top Contributor"]);
        assert_eq!(users[1].username, "B");
    }

    #[test]
    fn test_aggregate_total_equals_sum_of_author_scores() {
        let tips = vec![
            tip(1, "A", 3, &[]),
            tip(2, "B", 4, &[]),
            tip(3, "C", -2, &[]),
            tip(4, "B", 11, &[]),
            tip(5, "A", 0, &[]),
        ];
        let total: i64 = aggregate(&tips).iter().map(|u| u.score).sum();
        let expected: i64 = tips.iter().map(|t| t.user.score).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn test_aggregate_ties_keep_first_appearance() {
        let tips = vec![tip(1, "Zed", 5, &[]), tip(2, "Amy", 5, &[])];
        let users = aggregate(&tips);
        assert_eq!(users[0].username, "Zed");
        assert_eq!(users[1].username, "Amy");
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_badges_are_deduplicated() {
        let tips = vec![tip(1, "A", 1, &["X"]), tip(2, "A", 1, &["X", "Y"])];
        assert_eq!(aggregate(&tips)[0].badges, vec!["X", "Y"]);
    }

    #[test]
    fn test_reward_reorders_board() {
        let mut board = Leaderboard::new();
        board.recompute(&[tip(1, "A", 10, &[]), tip(2, "B", 12, &[])]);
        assert_eq!(board.users()[0].username, "B");

        assert!(board.reward("A", UPVOTE_REWARD));
        assert_eq!(board.users()[0].username, "A");
        assert_eq!(board.score_of("A"), Some(15));
    }

    #[test]
    fn test_rewards_survive_recompute() {
        let mut board = Leaderboard::new();
        let tips = vec![tip(1, "A", 10, &[])];
        board.recompute(&tips);
        board.reward("A", DOWNVOTE_PENALTY);
        board.recompute(&tips);
        assert_eq!(board.score_of("A"), Some(8));
    }

    #[test]
    fn test_ties_use_registration_order_across_recomputes() {
        let mut board = Leaderboard::new();
        board.recompute(&[tip(1, "Early", 5, &[])]);

        // A newer author is prepended, as freshly created tips are.
        board.recompute(&[tip(2, "Late", 5, &[]), tip(1, "Early", 5, &[])]);
        let names: Vec<_> = board.users().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[test]
    fn test_reward_unknown_user_is_recorded() {
        let mut board = Leaderboard::new();
        assert!(!board.reward("Ghost", UPVOTE_REWARD));
        board.recompute(&[tip(1, "Ghost", 1, &[])]);
        assert_eq!(board.score_of("Ghost"), Some(6));
    }

    #[test]
    fn test_top_truncates() {
        let mut board = Leaderboard::new();
        let tips: Vec<Tip> = (0..8).map(|i| tip(i, &format!("u{}", i), i, &[])).collect();
        board.recompute(&tips);
        assert_eq!(board.top(PODIUM_SIZE).len(), 5);
        assert_eq!(board.top(PODIUM_SIZE)[0].username, "u7");
        assert_eq!(board.top(100).len(), 8);
    }

    #[test]
    fn test_rating_reward_values() {
        assert_eq!(rating_reward(1), 5);
        assert_eq!(rating_reward(-1), -2);
    }

    #[test]
    fn test_podium_labels() {
        assert_eq!(podium(0), "🥇");
        assert_eq!(podium(2), "🥉");
        assert_eq!(podium(4), "5.");
    }
}
