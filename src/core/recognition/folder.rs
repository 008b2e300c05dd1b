//! Folder recognizer: walks a session folder and runs the strategy cascade
//! on every JPEG, in natural filename order.

use super::natural::natural_cmp;
use super::strategy::StrategyCascade;
use super::types::RecognitionRecord;
use super::Recognizer;
use crate::error::RecognitionError;
use crate::events::{Event, EventSender, RecognitionEvent, RecognitionProgress};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Recognizer over the images directly inside one folder
pub struct FolderRecognizer {
    folder: PathBuf,
    cascade: StrategyCascade,
    /// Per-path results, reused if the same folder is recognized twice
    cache: HashMap<PathBuf, RecognitionRecord>,
}

impl FolderRecognizer {
    pub fn new(folder: impl Into<PathBuf>, cascade: StrategyCascade) -> Self {
        Self {
            folder: folder.into(),
            cascade,
            cache: HashMap::new(),
        }
    }

    fn is_jpeg(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| JPEG_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// JPEG files directly in the folder, in natural filename order
    pub fn list_images(&self) -> Result<Vec<PathBuf>, RecognitionError> {
        if !self.folder.is_dir() {
            return Err(RecognitionError::FolderNotFound {
                path: self.folder.clone(),
            });
        }

        let mut images: Vec<PathBuf> = WalkDir::new(&self.folder)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && Self::is_jpeg(e.path()))
            .map(|e| e.into_path())
            .collect();

        images.sort_by(|a, b| {
            let name_a = a.file_name().unwrap_or_default().to_string_lossy();
            let name_b = b.file_name().unwrap_or_default().to_string_lossy();
            natural_cmp(&name_a, &name_b)
        });

        Ok(images)
    }

    fn recognize_one(&mut self, path: &Path) -> Result<RecognitionRecord, RecognitionError> {
        let metadata = fs::metadata(path).map_err(|source| RecognitionError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        let mut record = match self.cache.get(path) {
            Some(cached) => cached.clone(),
            None => {
                let record = match self.cascade.detect(path) {
                    Some(detection) => {
                        tracing::info!(
                            file = %path.display(),
                            code = %detection.code,
                            "QR detected"
                        );
                        RecognitionRecord::detected(detection)
                    }
                    None => RecognitionRecord::not_found("No QR code detected"),
                };
                self.cache.insert(path.to_path_buf(), record.clone());
                record
            }
        };

        record.file_path = path.display().to_string();
        record.file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        record.file_size = metadata.len();
        record.modified_time = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        Ok(record)
    }
}

impl Recognizer for FolderRecognizer {
    fn cache_size(&self) -> usize {
        self.cache.len()
    }

    fn recognize(&mut self, events: &EventSender) -> Result<Vec<RecognitionRecord>, RecognitionError> {
        let images = self.list_images()?;
        let total = images.len();

        if images.is_empty() {
            tracing::warn!(folder = %self.folder.display(), "No JPG files found");
        } else {
            tracing::info!(count = total, "Found JPG files to process");
        }

        events.send(Event::Recognition(RecognitionEvent::Started {
            total_images: total,
        }));

        let mut records = Vec::with_capacity(total);
        for (i, path) in images.iter().enumerate() {
            events.send(Event::Recognition(RecognitionEvent::Progress(
                RecognitionProgress {
                    current: i + 1,
                    total,
                    current_path: path.clone(),
                },
            )));
            records.push(self.recognize_one(path)?);
        }

        events.send(Event::Recognition(RecognitionEvent::Completed {
            total_images: total,
            qr_detected: records.iter().filter(|r| r.found).count(),
        }));

        Ok(records)
    }
}
