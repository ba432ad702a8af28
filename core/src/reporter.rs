//! Background reporter — periodically logs the leaderboard around the
//! currently selected user.
//!
//! One OS thread, one report per interval. A failed rating computation
//! downgrades a single tick to a warning; the thread itself never stops
//! until `stop()` signals it.

use crate::rating::{RatingReport, RatingRequest};
use crate::registry::UserRegistry;
use std::fmt::Write as _;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Handle to the reporter thread. Shutdown paths must call `stop()` so
/// the thread is joined before the process exits.
pub struct Reporter {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Reporter {
    /// Spawn the reporter against a shared registry.
    pub fn spawn(registry: Arc<UserRegistry>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::spawn(move || loop {
            // The stop channel doubles as the interval timer: a recv
            // timeout is a tick, anything else is shutdown.
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => tick(&registry),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self { stop_tx, handle }
    }

    /// Signal the thread and wait for its current tick to finish.
    pub fn stop(self) {
        // Send only fails if the thread already exited; join settles it
        // either way.
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

fn tick(registry: &UserRegistry) {
    let current = registry.current_user();
    let req = RatingRequest {
        user_id: current.clone(),
        ..RatingRequest::default()
    };
    match registry.compute_rating(&req) {
        Ok(report) => log::info!("rating\n{}", render_report(&report, current.as_deref())),
        Err(e) => log::warn!("rating report skipped: {e}"),
    }
}

/// Render one periodic report. The current user's row is starred.
fn render_report(report: &RatingReport, current: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== TOP {} ===", report.top_rated.len());
    for (i, u) in report.top_rated.iter().enumerate() {
        let _ = writeln!(out, "{}. {} --> {}", i + 1, u.name, u.total_revenue);
    }
    if !report.neighbours.is_empty() {
        let _ = writeln!(out, "=== NEIGHBOURS ===");
        for (i, u) in report.neighbours.iter().enumerate() {
            let mark = if current == Some(u.id.as_str()) { "* " } else { "" };
            let _ = writeln!(
                out,
                "{mark}{}. {} --> {}",
                report.best_neighbour_rank + i,
                u.name,
                u.total_revenue
            );
        }
    }
    out
}
