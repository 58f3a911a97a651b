//! State module for tracking crawl progress
//!
//! This module provides the state machine each unit of work moves through.
//!
//! # Components
//!
//! - `UnitState`: Tracks a single unit (scheduled, fetching, succeeded, failed, terminated)

mod unit_state;

// Re-export main types
pub use unit_state::UnitState;
