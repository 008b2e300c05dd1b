//! # Error Module
//!
//! User-friendly error types for the roster photo sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, participant positions, what went wrong
//! - **Smallest blast radius** - per-photo and per-group failures live in the
//!   copy ledger; only job-wide conditions surface here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum RosterSortError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Errors in the job description or participant roster
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Source folder does not exist: {path}")]
    SourceFolderMissing { path: PathBuf },

    #[error("Participants list is empty")]
    EmptyRoster,

    #[error("Participant {index} missing field: {field}")]
    ParticipantField { index: usize, field: &'static str },
}

/// Errors produced while turning images into recognition records
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    #[error("Failed to read detections from {path}: {source}")]
    ReadDetections {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detections file {path} is not valid: {source}")]
    MalformedDetections {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No images found or QR detection failed")]
    NoImages,

    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Job-wide materialization failures
///
/// Missing sources and failed copies are not errors at this level; they are
/// recorded in the copy report and the batch continues.
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("No destination folder specified")]
    NoDestination,

    #[error("Failed to create destination folder {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors writing intermediate snapshots
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to create artifact workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, RosterSortError>;
