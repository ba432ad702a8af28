//! dialboard-core — in-memory weekly leaderboard engine.
//!
//! Tracks per-user weekly revenue, maintains a live ranking, and answers
//! two queries: the global top-N list and a neighbour window around one
//! user. Revenue is week-scoped (Monday-start): a deal from a past week
//! reads as zero, reset lazily on the next deal and eagerly on every
//! rating query.
//!
//! The transport lives outside this crate. An API layer decodes requests
//! into `UserRegistry` operations and serializes `RatingReport`s back out;
//! `board-runner` in this workspace is the reference harness.

pub mod clock;
pub mod config;
pub mod error;
pub mod rating;
pub mod registry;
pub mod reporter;
pub mod types;
