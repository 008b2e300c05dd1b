//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while sorting a photo session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// QR recognition phase events
    Recognition(RecognitionEvent),
    /// Grouping phase events
    Grouping(GroupingEvent),
    /// Copy phase events
    Materialize(MaterializeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while reading QR payloads from images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecognitionEvent {
    /// Recognition has started
    Started { total_images: usize },
    /// One image has been examined
    Progress(RecognitionProgress),
    /// Recognition completed
    Completed {
        total_images: usize,
        qr_detected: usize,
    },
}

/// Progress information during recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionProgress {
    pub current: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Events from the sequential grouping scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupingEvent {
    /// Grouping has started
    Started { total_records: usize },
    /// A roster payload opened a new active group
    GroupOpened {
        qr_code: String,
        participant_name: String,
        /// True when an earlier run for the same payload was superseded
        reopened: bool,
    },
    /// A payload was read that is not on the roster
    UnknownCode { file_name: String, code: String },
    /// Grouping completed
    Completed {
        total_groups: usize,
        ungrouped_photos: usize,
    },
}

/// Events while copying photos into the destination tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MaterializeEvent {
    /// Copying has started
    Started { total_files: usize },
    /// Progress update during copying
    Progress(CopyProgress),
    /// A photo or group could not be copied; the batch continues
    Error { subject: String, message: String },
    /// Copying completed
    Completed {
        total_copied: usize,
        total_errors: usize,
    },
}

/// Progress information during copying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyProgress {
    /// Number of photos handled so far
    pub completed: usize,
    /// Total number of photos to handle
    pub total: usize,
    /// Photo currently being copied
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline stopped on a job-wide failure
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Validating,
    Recognizing,
    Grouping,
    Copying,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_images: usize,
    pub groups_created: usize,
    pub ungrouped_photos: usize,
    pub files_copied: usize,
    pub copy_errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Validating => write!(f, "Validating"),
            PipelinePhase::Recognizing => write!(f, "Detecting QR codes"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Copying => write!(f, "Copying"),
        }
    }
}
