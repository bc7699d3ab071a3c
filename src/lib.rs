//! Shorts Planner — deterministic short-form video plans from a creative brief.
//!
//! Maps a brief plus an integer seed to a timed beat script and supporting
//! idea lists, using weighted template selection driven by a seeded PRNG.
//! No inference, no I/O during generation: same brief, same seed, same plan.

pub mod core;
pub mod schema;

pub use crate::core::assembler::{generate, ListTargets, PlanError, Planner};
pub use crate::core::export::{script_text, PlanExport};
pub use crate::schema::plan::{Beat, Plan};
pub use crate::schema::request::{Length, PlanForm, PlanRequest, Platform};
