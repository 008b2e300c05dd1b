//! Types shared between recognizers and the grouping engine.

use serde::{Deserialize, Serialize};

/// One image as reported by a recognizer.
///
/// Every field has a default so that a detections file with gaps still loads;
/// a record missing its payload simply takes the "no QR" paths downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionRecord {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub modified_time: f64,
    #[serde(default)]
    pub confidence: f64,
    /// Diagnostic label of the strategy that produced the result
    #[serde(default)]
    pub method: String,
}

impl RecognitionRecord {
    /// The payload, if one was actually read.
    ///
    /// `None` when `found` is false or the code is missing or empty, whatever
    /// the other field says.
    pub fn payload(&self) -> Option<&str> {
        if !self.found {
            return None;
        }
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    /// Record for an image in which no strategy found a code
    pub fn not_found(method: impl Into<String>) -> Self {
        Self {
            found: false,
            code: None,
            confidence: 0.0,
            method: method.into(),
            ..Default::default()
        }
    }

    /// Record for an image with a decoded payload
    pub fn detected(detection: Detection) -> Self {
        Self {
            found: true,
            code: Some(detection.code),
            confidence: detection.confidence,
            method: detection.method,
            ..Default::default()
        }
    }
}

/// Output of a successful detection strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub code: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub method: String,
}

/// Shape of a recognizer output file: `{"results": [...]}` or a bare array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectionsFile {
    Wrapped {
        results: Vec<RecognitionRecord>,
    },
    Bare(Vec<RecognitionRecord>),
}

impl DetectionsFile {
    pub fn into_records(self) -> Vec<RecognitionRecord> {
        match self {
            DetectionsFile::Wrapped { results } => results,
            DetectionsFile::Bare(records) => records,
        }
    }
}

/// Snapshot written after recognition, in the recognizer's file format
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSnapshot<'a> {
    pub success: bool,
    pub total_images: usize,
    pub results: &'a [RecognitionRecord],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requires_found_flag() {
        let record = RecognitionRecord {
            found: false,
            code: Some("QR001".to_string()),
            ..Default::default()
        };
        assert_eq!(record.payload(), None);
    }

    #[test]
    fn empty_code_is_no_payload() {
        let record = RecognitionRecord {
            found: true,
            code: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(record.payload(), None);
    }

    #[test]
    fn sparse_record_deserializes_with_defaults() {
        let record: RecognitionRecord =
            serde_json::from_str(r#"{"file_name": "IMG_0001.jpg"}"#).unwrap();
        assert!(!record.found);
        assert_eq!(record.code, None);
        assert_eq!(record.file_name, "IMG_0001.jpg");
    }

    #[test]
    fn detections_file_accepts_both_shapes() {
        let wrapped: DetectionsFile =
            serde_json::from_str(r#"{"success": true, "results": [{"found": false}]}"#).unwrap();
        assert_eq!(wrapped.into_records().len(), 1);

        let bare: DetectionsFile = serde_json::from_str(r#"[{}, {}]"#).unwrap();
        assert_eq!(bare.into_records().len(), 2);
    }
}
