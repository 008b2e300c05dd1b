//! # Core Module
//!
//! The UI-agnostic photo sorting engine.
//!
//! ## Modules
//! - `roster` - Expected participants keyed by QR payload
//! - `recognition` - Turns images into ordered recognition records
//! - `grouping` - Assigns records to participants and scores the result
//! - `materialize` - Copies the grouping into a folder tree
//! - `artifacts` - Scoped workspace for intermediate snapshots
//! - `pipeline` - Orchestrates the full workflow

pub mod artifacts;
pub mod grouping;
pub mod materialize;
pub mod pipeline;
pub mod recognition;
pub mod roster;

// Re-export commonly used types
pub use grouping::{GroupingEngine, GroupingReport, GroupingResult, PhotoGroup, UngroupReason};
pub use materialize::{CopyReport, Materializer};
pub use pipeline::{JobConfig, JobReport, Pipeline};
pub use recognition::{RecognitionRecord, Recognizer};
pub use roster::{Participant, ParticipantRoster};
