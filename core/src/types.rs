//! Shared primitive types used across the engine.

/// A stable, unique identifier for a registered user.
pub type UserId = String;

/// Accumulated weekly revenue. Reads as zero once its week has passed.
pub type Revenue = f64;
