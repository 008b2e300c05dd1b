//! # Pipeline Module
//!
//! Orchestrates one photo sorting job.
//!
//! ## Pipeline Stages
//! 1. **Validate** - Check the job file and build the roster
//! 2. **Recognize** - Read QR payloads, or replay a detections file
//! 3. **Group** - Assign photos to participants in stream order
//! 4. **Copy** - Materialize the grouping under the destination folder
//!
//! Snapshots of stages 2 and 3 go to a temporary workspace that is removed
//! when the job ends unless `options.keep_artifacts` is set.

mod config;
mod executor;
mod report;

pub use config::{JobConfig, JobOptions, ValidatedJob};
pub use executor::{Pipeline, PipelineBuilder};
pub use report::{JobReport, ProcessingSummary};
