//! The user registry — the authoritative, lock-guarded user database.
//!
//! RULES:
//!   - Every operation holds the registry lock for its full duration.
//!     Mutations never interleave, and a rating query observes a snapshot
//!     no concurrent mutation can tear.
//!   - Records are never deleted; an id, once registered, stays for the
//!     process lifetime.
//!   - Stored revenue is only trustworthy within the week of the last
//!     deal. Both `record_deal` (lazily) and `compute_rating` (eagerly)
//!     zero revenue whose week has passed; they share one week predicate
//!     and never reach different conclusions.

use crate::{
    clock::{self, Clock, SystemClock},
    error::{RegistryError, RegistryResult},
    rating::{self, RatedUser, RatingReport, RatingRequest},
    types::{Revenue, UserId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One registered user.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub connected: bool,
    pub total_revenue: Revenue,
    /// Time of the last revenue-bearing deal. `None` until the first one.
    pub last_deal: Option<DateTime<Utc>>,
}

struct RegistryState {
    users: HashMap<UserId, UserRecord>,
    /// Subject of the periodic report. Independent of any per-query id.
    current_user: Option<UserId>,
}

/// The registry service. Construct once at startup and share via `Arc`
/// between the API layer and the reporter; tests construct as many as
/// they like, nothing is process-global.
pub struct UserRegistry {
    clock: Arc<dyn Clock>,
    state: Mutex<RegistryState>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Build against a substitute time source. Tests drive week rollover
    /// through a shared `ManualClock` handle.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(RegistryState {
                users: HashMap::new(),
                current_user: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().expect("registry lock poisoned")
    }

    fn user_mut<'a>(
        state: &'a mut RegistryState,
        id: &str,
    ) -> RegistryResult<&'a mut UserRecord> {
        state
            .users
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    /// Insert a new, disconnected user with zero revenue.
    pub fn register(&self, id: &str, name: &str) -> RegistryResult<()> {
        if id.is_empty() {
            return Err(RegistryError::InvalidArgument { what: "user id" });
        }
        if name.is_empty() {
            return Err(RegistryError::InvalidArgument { what: "user name" });
        }
        let mut state = self.lock();
        if state.users.contains_key(id) {
            return Err(RegistryError::AlreadyExists { id: id.to_string() });
        }
        state.users.insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                name: name.to_string(),
                connected: false,
                total_revenue: 0.0,
                last_deal: None,
            },
        );
        Ok(())
    }

    pub fn set_connected(&self, id: &str) -> RegistryResult<()> {
        let mut state = self.lock();
        let user = Self::user_mut(&mut state, id)?;
        if user.connected {
            return Err(RegistryError::AlreadyConnected { id: id.to_string() });
        }
        user.connected = true;
        Ok(())
    }

    pub fn set_disconnected(&self, id: &str) -> RegistryResult<()> {
        let mut state = self.lock();
        let user = Self::user_mut(&mut state, id)?;
        if !user.connected {
            return Err(RegistryError::NotConnected { id: id.to_string() });
        }
        user.connected = false;
        Ok(())
    }

    pub fn rename(&self, id: &str, new_name: &str) -> RegistryResult<()> {
        if id.is_empty() {
            return Err(RegistryError::InvalidArgument { what: "user id" });
        }
        if new_name.is_empty() {
            return Err(RegistryError::InvalidArgument { what: "user name" });
        }
        let mut state = self.lock();
        let user = Self::user_mut(&mut state, id)?;
        user.name = new_name.to_string();
        Ok(())
    }

    /// Credit a deal to a connected user.
    ///
    /// A deal is the lazy trigger for the weekly reset: revenue left over
    /// from a past week is zeroed before anything else. The new amount
    /// then counts only if `deal_time` itself is in the current week — a
    /// backdated or future deal is accepted but contributes nothing and
    /// does not advance `last_deal`, though it may still have zeroed a
    /// stale balance.
    pub fn record_deal(
        &self,
        id: &str,
        deal_time: DateTime<Utc>,
        amount: Revenue,
    ) -> RegistryResult<()> {
        let mut state = self.lock();
        let user = Self::user_mut(&mut state, id)?;
        if !user.connected {
            return Err(RegistryError::NotConnected { id: id.to_string() });
        }
        if revenue_is_stale(user, self.clock.as_ref()) {
            user.total_revenue = 0.0;
        }
        if clock::is_current_week(self.clock.as_ref(), deal_time) {
            user.total_revenue += amount;
            user.last_deal = Some(deal_time);
        }
        Ok(())
    }

    /// Select the subject of the periodic report. Unlike the per-query
    /// user id, selection is validated: unknown ids are rejected.
    pub fn select_current_user(&self, id: &str) -> RegistryResult<()> {
        let mut state = self.lock();
        if !state.users.contains_key(id) {
            return Err(RegistryError::NotFound { id: id.to_string() });
        }
        state.current_user = Some(id.to_string());
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.lock().current_user.clone()
    }

    /// Cloned view of one record. Callers never see the live entry.
    pub fn user(&self, id: &str) -> Option<UserRecord> {
        self.lock().users.get(id).cloned()
    }

    /// Run a rating query. Runs under the registry lock like any other
    /// operation, so the sort sees a consistent snapshot.
    ///
    /// The eager staleness sweep runs first: every record still carrying
    /// revenue from a past week is zeroed in place, converging the stored
    /// values with what `record_deal` would lazily conclude per record.
    /// Running the sweep twice in a row is a no-op.
    pub fn compute_rating(&self, req: &RatingRequest) -> RegistryResult<RatingReport> {
        let mut state = self.lock();

        for user in state.users.values_mut() {
            if revenue_is_stale(user, self.clock.as_ref()) {
                user.total_revenue = 0.0;
            }
        }

        let snapshot: Vec<RatedUser> = state
            .users
            .values()
            .map(|u| RatedUser {
                id: u.id.clone(),
                name: u.name.clone(),
                total_revenue: u.total_revenue,
            })
            .collect();
        let ordering = rating::rank(snapshot);

        let mut report = RatingReport {
            top_rated: ordering.iter().take(req.top_n).cloned().collect(),
            total_users: ordering.len(),
            ..RatingReport::default()
        };

        if let Some(user_id) = &req.user_id {
            let pos = ordering
                .iter()
                .position(|u| &u.id == user_id)
                .ok_or_else(|| RegistryError::NotFound {
                    id: user_id.clone(),
                })?;
            let (lo, hi) = rating::neighbour_window(ordering.len(), pos, req.near_n);
            report.best_neighbour_rank = lo + 1;
            report.user_rank = report.best_neighbour_rank + (pos - lo);
            report.neighbours = ordering[lo..hi].to_vec();
        }

        Ok(report)
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Revenue counts as stale when there is some and the deal that earned
/// it is not in the current week. A record that never dealt carries no
/// revenue, so it is never stale.
fn revenue_is_stale(user: &UserRecord, clock: &dyn Clock) -> bool {
    user.total_revenue != 0.0
        && !user
            .last_deal
            .is_some_and(|t| clock::is_current_week(clock, t))
}
