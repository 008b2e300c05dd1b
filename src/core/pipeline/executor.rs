//! Pipeline execution implementation.

use super::config::{JobConfig, ValidatedJob};
use super::report::{JobReport, ProcessingSummary};
use crate::core::artifacts::{ArtifactWorkspace, DETECTION_SNAPSHOT, GROUPING_SNAPSHOT};
use crate::core::grouping::{GroupingEngine, GroupingReport};
use crate::core::materialize::{CopyReport, Materializer};
use crate::core::recognition::{
    DetectionSnapshot, DetectionsFileRecognizer, FolderRecognizer, Recognizer, StrategyCascade,
};
use crate::error::{MaterializeError, RecognitionError, RosterSortError};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    job: JobConfig,
    recognizer: Option<Box<dyn Recognizer>>,
    cascade: StrategyCascade,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            job: JobConfig::default(),
            recognizer: None,
            cascade: StrategyCascade::new(),
        }
    }

    /// Set the job to run
    pub fn job(mut self, job: JobConfig) -> Self {
        self.job = job;
        self
    }

    /// Use this recognizer instead of the one the job implies
    pub fn recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Detection strategies for scanning the source folder
    pub fn cascade(mut self, cascade: StrategyCascade) -> Self {
        self.cascade = cascade;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            job: self.job,
            recognizer: self.recognizer,
            cascade: self.cascade,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate, recognize, group and copy one photo session
pub struct Pipeline {
    job: JobConfig,
    recognizer: Option<Box<dyn Recognizer>>,
    cascade: StrategyCascade,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the pipeline without events
    pub fn run(self) -> JobReport {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Never fails: a stage that cannot complete turns into a failed report.
    pub fn run_with_events(self, events: &EventSender) -> JobReport {
        let start_time = Instant::now();
        let job_id = Uuid::new_v4();
        let mut report = JobReport::new(job_id, Utc::now());

        tracing::info!(%job_id, "Starting photo sorting job");
        events.send(Event::Pipeline(PipelineEvent::Started));

        if let Err(e) = self.execute(events, &mut report) {
            tracing::error!(%job_id, error = %e, "Job failed");
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
            report = report.fail(e.to_string());
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;

        if report.success {
            let copying = report.copying.as_ref();
            let grouping = report.grouping_result();
            events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: PipelineSummary {
                    total_images: report.detections.len(),
                    groups_created: grouping.map_or(0, |g| g.groups.len()),
                    ungrouped_photos: grouping.map_or(0, |g| g.ungrouped_photos.len()),
                    files_copied: copying.map_or(0, |c| c.summary.total_copied),
                    copy_errors: copying.map_or(0, |c| c.summary.total_errors),
                    duration_ms: report.duration_ms,
                },
            }));
            tracing::info!(%job_id, duration_ms = report.duration_ms, "Job completed");
        }

        report
    }

    fn execute(self, events: &EventSender, report: &mut JobReport) -> Result<(), RosterSortError> {
        // Phase 1: Validating
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Validating,
        }));
        let job = self.job.validate()?;

        let workspace = ArtifactWorkspace::create()?;

        // Phase 2: Recognizing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Recognizing,
        }));
        let mut recognizer = match self.recognizer {
            Some(recognizer) => recognizer,
            None => Self::default_recognizer(&job, self.cascade),
        };
        let records = recognizer.recognize(events)?;
        if records.is_empty() {
            return Err(RecognitionError::NoImages.into());
        }
        workspace.write_json(
            DETECTION_SNAPSHOT,
            &DetectionSnapshot {
                success: true,
                total_images: records.len(),
                results: &records,
            },
        )?;

        // Phase 3: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let grouping = GroupingEngine::new(&job.roster)
            .with_events(events.clone())
            .group(&records);
        let mut summary = ProcessingSummary::new(&records, &grouping);
        summary.cache_size = recognizer.cache_size();
        let grouping = GroupingReport::success(grouping);
        workspace.write_json(GROUPING_SNAPSHOT, &grouping)?;

        // Phase 4: Copying
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Copying,
        }));
        let copying = match (&job.destination_folder, grouping.result.as_ref()) {
            (Some(destination), Some(result)) => Materializer::new()
                .with_roster(&job.roster)
                .with_events(events.clone())
                .materialize(result, destination)
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Photo copying failed");
                    CopyReport::failure(e.to_string())
                }),
            _ => {
                tracing::warn!("No destination folder specified, skipping copy");
                CopyReport::failure(MaterializeError::NoDestination.to_string())
            }
        };

        if job.options.keep_artifacts {
            let kept = workspace.keep();
            tracing::info!(path = %kept.display(), "Kept intermediate artifacts");
            summary.artifacts_directory = Some(kept);
        }

        report.success = true;
        report.processing_summary = Some(summary);
        report.detections = records;
        report.grouping = Some(grouping);
        report.copying = Some(copying);
        Ok(())
    }

    fn default_recognizer(job: &ValidatedJob, cascade: StrategyCascade) -> Box<dyn Recognizer> {
        match &job.detections_file {
            Some(path) => Box::new(DetectionsFileRecognizer::new(path)),
            None => {
                if cascade.is_empty() {
                    tracing::warn!("No detection strategies configured; every photo will be unread");
                }
                Box::new(FolderRecognizer::new(&job.source_folder, cascade))
            }
        }
    }
}
