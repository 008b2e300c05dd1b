//! # Materialize Module
//!
//! Copies a grouping into a destination tree. Sources are never modified.
//!
//! ## Layout
//! ```text
//! <destination>/
//!   <classroom>/
//!     <participant> - <payload>/
//!       <stem>_qr<payload><.ext>
//!   Não Agrupadas/
//!     <original file name>
//! ```
//!
//! Names are mojibake-repaired and then sanitized. Per-photo and per-group
//! failures are recorded in the [`CopyReport`] and the batch continues.

mod executor;
mod naming;
mod types;

pub use executor::Materializer;
pub use naming::{
    participant_folder_name, qr_tag, repair_mojibake, sanitize_component, tagged_file_name,
    DEFAULT_CLASSROOM, UNASSIGNED_FOLDER,
};
pub use types::{CopyError, CopyLedgerEntry, CopyReport, CopySummary};
