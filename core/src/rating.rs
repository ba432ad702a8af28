//! Ranking engine — ordering and window selection over a registry snapshot.
//!
//! RULES:
//!   - Operates only on snapshots handed over by the registry under its
//!     lock; never touches shared state itself.
//!   - The order is descending by revenue, ties broken by ascending id,
//!     so every rank is deterministic within one snapshot.
//!   - All ranks are 1-based.

use crate::types::{Revenue, UserId};
use serde::Serialize;

/// Parameters for one rating query. Built fresh per call.
#[derive(Debug, Clone)]
pub struct RatingRequest {
    /// User to centre the neighbour window on. `None` = top list only.
    pub user_id: Option<UserId>,
    /// Length cap for the global top list.
    pub top_n: usize,
    /// Half-window size around `user_id`.
    pub near_n: usize,
}

impl Default for RatingRequest {
    fn default() -> Self {
        Self {
            user_id: None,
            top_n: 10,
            near_n: 10,
        }
    }
}

/// One leaderboard entry, copied out of the registry at snapshot time.
/// Later registry mutations never reach into an already-built entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedUser {
    pub id: UserId,
    pub name: String,
    pub total_revenue: Revenue,
}

/// The answer to one rating query. Both lists are cut from the same
/// ordering, so ranks in one are comparable with ranks in the other.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatingReport {
    /// Best `top_n` users, best first.
    pub top_rated: Vec<RatedUser>,
    /// Window around the queried user, best first. Empty when no user
    /// was queried.
    pub neighbours: Vec<RatedUser>,
    /// Rank of the queried user in the full ordering. Zero when no user
    /// was queried.
    pub user_rank: usize,
    /// Rank of the first entry of `neighbours`.
    pub best_neighbour_rank: usize,
    /// Registry size at snapshot time.
    pub total_users: usize,
}

/// Total order over a snapshot: descending revenue, then ascending id.
pub(crate) fn rank(mut snapshot: Vec<RatedUser>) -> Vec<RatedUser> {
    snapshot.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.id.cmp(&b.id))
    });
    snapshot
}

/// Select the neighbour window around position `pos` in an ordering of
/// `len` entries. Returns half-open bounds `(lo, hi)`.
///
/// The window grows outward from the user: each step extends one entry
/// toward better rank and one toward worse, clipping at either edge, and
/// stops early only once both directions are exhausted. The worse-rank
/// edge is then extended exactly once more; mid-board that balances the
/// window to `near_n` neighbours on each side, and at an edge the lost
/// entries are not compensated on the other side beyond that one step.
pub(crate) fn neighbour_window(len: usize, pos: usize, near_n: usize) -> (usize, usize) {
    debug_assert!(pos < len);
    let mut lo = pos.saturating_sub(1);
    let mut hi = pos + 1;
    for _ in 0..near_n.saturating_sub(1) {
        if hi < len {
            hi += 1;
        }
        lo = lo.saturating_sub(1);
        if hi == len && lo == 0 {
            break;
        }
    }
    if hi < len {
        hi += 1;
    }
    (lo, hi)
}
