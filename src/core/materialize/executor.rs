//! Copies grouped photos into the destination tree.

use super::naming::*;
use super::types::*;
use crate::core::grouping::{GroupingResult, PhotoGroup, UngroupedPhoto};
use crate::core::recognition::RecognitionRecord;
use crate::core::roster::ParticipantRoster;
use crate::error::MaterializeError;
use crate::events::{null_sender, CopyProgress, Event, EventSender, MaterializeEvent};
use std::collections::HashSet;
use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Turns a grouping into folders and files on disk
pub struct Materializer<'a> {
    roster: Option<&'a ParticipantRoster>,
    events: EventSender,
}

/// Mutable bookkeeping for one run
struct Ledger {
    copied: Vec<CopyLedgerEntry>,
    errors: Vec<CopyError>,
    created_dirs: HashSet<PathBuf>,
    completed: usize,
    total: usize,
    last_progress: Instant,
}

impl Ledger {
    fn new(total: usize) -> Self {
        Self {
            copied: Vec::new(),
            errors: Vec::new(),
            created_dirs: HashSet::new(),
            completed: 0,
            total,
            last_progress: Instant::now(),
        }
    }

    fn ensure_dir(&mut self, dir: &Path) -> io::Result<()> {
        if !self.created_dirs.contains(dir) {
            fs::create_dir_all(dir)?;
            self.created_dirs.insert(dir.to_path_buf());
        }
        Ok(())
    }

    fn photo_error(&mut self, events: &EventSender, record: &RecognitionRecord, message: String) {
        tracing::error!(photo = %record.file_name, "{}", message);
        let photo = if record.file_name.is_empty() {
            "Unknown".to_string()
        } else {
            record.file_name.clone()
        };
        events.send(Event::Materialize(MaterializeEvent::Error {
            subject: photo.clone(),
            message: message.clone(),
        }));
        self.errors.push(CopyError::Photo {
            photo,
            error: message,
        });
    }

    fn group_error(&mut self, events: &EventSender, group: &str, message: String) {
        tracing::error!(group, "{}", message);
        events.send(Event::Materialize(MaterializeEvent::Error {
            subject: group.to_string(),
            message: message.clone(),
        }));
        self.errors.push(CopyError::Group {
            group: group.to_string(),
            error: message,
        });
    }

    fn tick(&mut self, events: &EventSender, current: &Path) {
        self.completed += 1;
        let now = Instant::now();
        if now.duration_since(self.last_progress) >= PROGRESS_INTERVAL || self.completed == self.total {
            events.send(Event::Materialize(MaterializeEvent::Progress(CopyProgress {
                completed: self.completed,
                total: self.total,
                current_path: current.to_path_buf(),
            })));
            self.last_progress = now;
        }
    }
}

/// Copy `source` to `destination`, keeping permissions and file times
fn copy_preserving_metadata(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;

    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    OpenOptions::new()
        .write(true)
        .open(destination)?
        .set_times(times)
}

fn non_blank(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}

impl<'a> Materializer<'a> {
    pub fn new() -> Self {
        Self {
            roster: None,
            events: null_sender(),
        }
    }

    /// Prefer roster names and classrooms over the ones carried by groups
    pub fn with_roster(mut self, roster: &'a ParticipantRoster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Participant name and classroom for a group, mojibake repaired
    fn resolve_labels(&self, group: &PhotoGroup) -> (String, String) {
        let participant = self.roster.and_then(|r| r.get(&group.qr_code));

        let name = participant
            .and_then(|p| non_blank(&p.name))
            .or_else(|| non_blank(&group.participant_name))
            .map(str::to_string)
            .unwrap_or_else(|| format!("QR_{}", group.qr_code));

        let classroom = participant
            .and_then(|p| non_blank(&p.turma))
            .or_else(|| non_blank(&group.classroom_label))
            .unwrap_or(DEFAULT_CLASSROOM);

        (
            repair_mojibake(&name).into_owned(),
            repair_mojibake(classroom).into_owned(),
        )
    }

    /// Copy every grouped and ungrouped photo under `destination_root`.
    ///
    /// Only failing to create the root itself is an error; everything else
    /// lands in the report and the batch carries on.
    pub fn materialize(
        &self,
        result: &GroupingResult,
        destination_root: &Path,
    ) -> Result<CopyReport, MaterializeError> {
        let start = Instant::now();

        if destination_root.as_os_str().is_empty() {
            return Err(MaterializeError::NoDestination);
        }
        fs::create_dir_all(destination_root).map_err(|source| MaterializeError::CreateRoot {
            path: destination_root.to_path_buf(),
            source,
        })?;

        let mut ledger = Ledger::new(result.total_photos());
        self.events.send(Event::Materialize(MaterializeEvent::Started {
            total_files: ledger.total,
        }));

        for group in result.all_groups() {
            if let Err(e) = self.materialize_group(group, destination_root, &mut ledger) {
                let message = format!("Error processing group {}: {}", group.qr_code, e);
                ledger.group_error(&self.events, &group.qr_code, message);
            }
        }

        if !result.ungrouped_photos.is_empty() {
            self.materialize_ungrouped(&result.ungrouped_photos, destination_root, &mut ledger);
        }

        let summary = CopySummary {
            total_copied: ledger.copied.len(),
            total_errors: ledger.errors.len(),
        };

        tracing::info!(
            copied = summary.total_copied,
            errors = summary.total_errors,
            "Photo copying completed"
        );
        self.events.send(Event::Materialize(MaterializeEvent::Completed {
            total_copied: summary.total_copied,
            total_errors: summary.total_errors,
        }));

        Ok(CopyReport {
            success: CopyReport::is_successful(summary.total_copied, summary.total_errors),
            error: None,
            copied_files: ledger.copied,
            errors: ledger.errors,
            summary,
            folders_created: ledger.created_dirs.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn materialize_group(
        &self,
        group: &PhotoGroup,
        root: &Path,
        ledger: &mut Ledger,
    ) -> io::Result<()> {
        let (participant_name, classroom) = self.resolve_labels(group);

        let classroom_dir = root.join(sanitize_component(&classroom));
        let participant_dir =
            classroom_dir.join(participant_folder_name(&participant_name, &group.qr_code));
        ledger.ensure_dir(&classroom_dir)?;
        ledger.ensure_dir(&participant_dir)?;

        for photo in &group.photos {
            let source = Path::new(&photo.file_path);
            ledger.tick(&self.events, source);

            if photo.file_path.is_empty() || !source.exists() {
                let message = format!("Source file not found: {}", photo.file_path);
                ledger.photo_error(&self.events, photo, message);
                continue;
            }

            let original_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| photo.file_name.clone());
            let file_name = tagged_file_name(&original_name, &group.qr_code);
            let destination = participant_dir.join(&file_name);

            match copy_preserving_metadata(source, &destination) {
                Ok(()) => {
                    tracing::info!(
                        "Copied {} -> {} to {}/{} folder",
                        original_name,
                        file_name,
                        participant_name,
                        classroom
                    );
                    ledger.copied.push(CopyLedgerEntry {
                        source_path: photo.file_path.clone(),
                        destination_path: destination.display().to_string(),
                        participant_name: participant_name.clone(),
                        qr_code: Some(group.qr_code.clone()),
                        classroom_label: Some(classroom.clone()),
                        reason: None,
                    });
                }
                Err(e) => {
                    let message = format!("Error copying {}: {}", photo.file_name, e);
                    ledger.photo_error(&self.events, photo, message);
                }
            }
        }

        Ok(())
    }

    fn materialize_ungrouped(&self, photos: &[UngroupedPhoto], root: &Path, ledger: &mut Ledger) {
        let folder = root.join(UNASSIGNED_FOLDER);
        if let Err(e) = ledger.ensure_dir(&folder) {
            let message = format!("Error creating {}: {}", folder.display(), e);
            ledger.group_error(&self.events, UNASSIGNED_FOLDER, message);
            return;
        }

        for photo in photos {
            let record = &photo.record;
            let source = Path::new(&record.file_path);
            ledger.tick(&self.events, source);

            let file_name = match source.file_name() {
                Some(name) if source.exists() => name.to_owned(),
                _ => {
                    let message = format!("Source file not found: {}", record.file_path);
                    ledger.photo_error(&self.events, record, message);
                    continue;
                }
            };
            let destination = folder.join(&file_name);

            match copy_preserving_metadata(source, &destination) {
                Ok(()) => {
                    tracing::info!(
                        "Copied {} to {} folder",
                        file_name.to_string_lossy(),
                        UNASSIGNED_FOLDER
                    );
                    ledger.copied.push(CopyLedgerEntry {
                        source_path: record.file_path.clone(),
                        destination_path: destination.display().to_string(),
                        participant_name: UNASSIGNED_FOLDER.to_string(),
                        qr_code: None,
                        classroom_label: None,
                        reason: Some(photo.reason),
                    });
                }
                Err(e) => {
                    let message = format!("Error copying ungrouped {}: {}", record.file_name, e);
                    ledger.photo_error(&self.events, record, message);
                }
            }
        }
    }
}

impl Default for Materializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}
