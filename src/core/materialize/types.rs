//! Types for the copy ledger.

use crate::core::grouping::UngroupReason;
use serde::{Deserialize, Serialize};

/// One photo copied into the destination tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyLedgerEntry {
    pub source_path: String,
    pub destination_path: String,
    pub participant_name: String,
    pub qr_code: Option<String>,
    pub classroom_label: Option<String>,
    /// Set for photos copied to the unassigned folder
    pub reason: Option<UngroupReason>,
}

/// A failure that did not stop the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CopyError {
    Photo { photo: String, error: String },
    Group { group: String, error: String },
}

impl CopyError {
    pub fn subject(&self) -> &str {
        match self {
            CopyError::Photo { photo, .. } => photo,
            CopyError::Group { group, .. } => group,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CopyError::Photo { error, .. } | CopyError::Group { error, .. } => error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopySummary {
    pub total_copied: usize,
    pub total_errors: usize,
}

/// Result of materializing a grouping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyReport {
    /// At least one file copied, or nothing went wrong
    pub success: bool,
    /// Why the stage did not run at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub copied_files: Vec<CopyLedgerEntry>,
    pub errors: Vec<CopyError>,
    pub summary: CopySummary,
    pub folders_created: usize,
    pub duration_ms: u64,
}

impl CopyReport {
    /// Success rule: `total_copied > 0 || total_errors == 0`.
    ///
    /// An empty run with nothing to copy still succeeds; a run where only
    /// some copies failed also succeeds.
    pub fn is_successful(total_copied: usize, total_errors: usize) -> bool {
        total_copied > 0 || total_errors == 0
    }

    /// A copy stage that could not start
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}
