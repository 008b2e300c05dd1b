//! The job report handed back to the host.

use crate::core::grouping::{GroupingReport, GroupingResult};
use crate::core::materialize::CopyReport;
use crate::core::recognition::RecognitionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Headline numbers for a job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
    pub total_images: usize,
    pub qr_detected: usize,
    /// Percentage of images with a detection, 0 when there are none
    pub qr_detection_rate: f64,
    pub groups_created: usize,
    pub ungrouped_photos: usize,
    /// Memoized recognition results held by the recognizer
    pub cache_size: usize,
    /// Where snapshots were left, when asked to keep them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_directory: Option<PathBuf>,
}

impl ProcessingSummary {
    pub fn new(records: &[RecognitionRecord], grouping: &GroupingResult) -> Self {
        let qr_detected = records.iter().filter(|r| r.found).count();
        let qr_detection_rate = if records.is_empty() {
            0.0
        } else {
            qr_detected as f64 / records.len() as f64 * 100.0
        };

        Self {
            total_images: records.len(),
            qr_detected,
            qr_detection_rate,
            groups_created: grouping.groups.len(),
            ungrouped_photos: grouping.ungrouped_photos.len(),
            cache_size: 0,
            artifacts_directory: None,
        }
    }
}

/// Everything a job produced
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_summary: Option<ProcessingSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detections: Vec<RecognitionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<GroupingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copying: Option<CopyReport>,
    pub duration_ms: u64,
}

impl JobReport {
    pub fn new(job_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            started_at,
            success: false,
            error: None,
            processing_summary: None,
            detections: Vec::new(),
            grouping: None,
            copying: None,
            duration_ms: 0,
        }
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(message.into());
        self
    }

    /// The grouping, when the job got that far
    pub fn grouping_result(&self) -> Option<&GroupingResult> {
        self.grouping.as_ref().and_then(|g| g.result.as_ref())
    }
}
