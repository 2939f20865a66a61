//! Planning module: the state comparison engine.
//!
//! This module aligns current and desired resources by identity and
//! computes the resulting change set. It performs no I/O and never fails.

mod diff;
pub mod equality;

pub use diff::{ChangeType, Diff, DiffEngine, DiffSummary, PropertyChange, ResourceChange};
