//! Replays a recognizer output file, keeping the order it was written in.

use super::types::{DetectionsFile, RecognitionRecord};
use super::Recognizer;
use crate::error::RecognitionError;
use crate::events::{Event, EventSender, RecognitionEvent};
use std::fs;
use std::path::PathBuf;

/// Recognizer backed by a detections JSON file
pub struct DetectionsFileRecognizer {
    path: PathBuf,
}

impl DetectionsFileRecognizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the file without emitting events
    pub fn load(&self) -> Result<Vec<RecognitionRecord>, RecognitionError> {
        let text = fs::read_to_string(&self.path).map_err(|source| RecognitionError::ReadDetections {
            path: self.path.clone(),
            source,
        })?;
        let file: DetectionsFile =
            serde_json::from_str(&text).map_err(|source| RecognitionError::MalformedDetections {
                path: self.path.clone(),
                source,
            })?;
        Ok(file.into_records())
    }
}

impl Recognizer for DetectionsFileRecognizer {
    fn recognize(&mut self, events: &EventSender) -> Result<Vec<RecognitionRecord>, RecognitionError> {
        let records = self.load()?;

        events.send(Event::Recognition(RecognitionEvent::Started {
            total_images: records.len(),
        }));
        events.send(Event::Recognition(RecognitionEvent::Completed {
            total_images: records.len(),
            qr_detected: records.iter().filter(|r| r.found).count(),
        }));

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded detection results"
        );
        Ok(records)
    }
}
