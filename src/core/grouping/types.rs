//! Types produced by the grouping engine.

use crate::core::recognition::RecognitionRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a photo could not be placed in a group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UngroupReason {
    /// A payload was read but it is not on the roster
    UnknownQrCode,
    /// No payload, and no participant sequence was active yet
    NoQrDetected,
}

impl UngroupReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownQrCode => "unknown_qr_code",
            Self::NoQrDetected => "no_qr_detected",
        }
    }
}

impl std::fmt::Display for UngroupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A photo left outside every group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UngroupedPhoto {
    #[serde(flatten)]
    pub record: RecognitionRecord,
    pub reason: UngroupReason,
}

/// The photos of one contiguous run for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoGroup {
    pub qr_code: String,
    pub participant_name: String,
    pub classroom_label: String,
    /// 0 for the first run of this payload in the stream, 1 for the next, ...
    pub run_index: usize,
    /// Processing order, never re-sorted
    pub photos: Vec<RecognitionRecord>,
    pub confidence_score: f64,
    pub time_span_seconds: f64,
}

impl PhotoGroup {
    pub fn new(
        qr_code: impl Into<String>,
        participant_name: impl Into<String>,
        classroom_label: impl Into<String>,
        run_index: usize,
    ) -> Self {
        Self {
            qr_code: qr_code.into(),
            participant_name: participant_name.into(),
            classroom_label: classroom_label.into(),
            run_index,
            photos: Vec::new(),
            confidence_score: 0.0,
            time_span_seconds: 0.0,
        }
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    /// Photos in which the payload itself was read
    pub fn detected_count(&self) -> usize {
        self.photos.iter().filter(|p| p.found).count()
    }

    /// Seconds between the oldest and newest photo; 0 with fewer than two
    pub fn time_span(&self) -> f64 {
        if self.photos.len() < 2 {
            return 0.0;
        }
        let (min, max) = self
            .photos
            .iter()
            .map(|p| p.modified_time)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            });
        max - min
    }
}

/// Aggregate numbers over one grouping run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingStatistics {
    pub total_photos: usize,
    pub grouped_photos: usize,
    pub ungrouped_photos: usize,
    /// Percentage of photos that landed in a group (0-100)
    pub grouping_success_rate: f64,
    pub total_participants: usize,
    pub participants_with_photos: usize,
    pub participants_without_photos: usize,
    pub total_groups: usize,
    pub average_group_size: f64,
    pub largest_group_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowConfidenceGroup {
    pub qr_code: String,
    pub participant_name: String,
    pub run_index: usize,
    pub confidence: f64,
    pub photo_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UngroupedWithQr {
    pub file_name: String,
    pub detected_qr: String,
    pub reason: UngroupReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OversizedGroup {
    pub qr_code: String,
    pub participant_name: String,
    pub run_index: usize,
    pub photo_count: usize,
    pub time_span_hours: f64,
}

/// A payload whose photos arrived in more than one disjoint run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedParticipant {
    pub qr_code: String,
    pub participant_name: String,
    pub runs: usize,
    pub photo_count: usize,
}

/// Advisory hints for a human reviewer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub low_confidence_groups: Vec<LowConfidenceGroup>,
    pub ungrouped_with_qr: Vec<UngroupedWithQr>,
    pub oversized_groups: Vec<OversizedGroup>,
    pub repeated_participants: Vec<RepeatedParticipant>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.low_confidence_groups.is_empty()
            && self.ungrouped_with_qr.is_empty()
            && self.oversized_groups.is_empty()
            && self.repeated_participants.is_empty()
    }
}

/// Everything the grouping engine decided
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingResult {
    /// Latest run for each payload, keyed by payload
    pub groups: BTreeMap<String, PhotoGroup>,
    /// Earlier runs of payloads that reappeared later in the stream
    pub superseded_groups: Vec<PhotoGroup>,
    pub ungrouped_photos: Vec<UngroupedPhoto>,
    pub statistics: GroupingStatistics,
    pub suggestions: Suggestions,
}

impl GroupingResult {
    /// Addressable groups followed by superseded runs
    pub fn all_groups(&self) -> impl Iterator<Item = &PhotoGroup> {
        self.groups.values().chain(self.superseded_groups.iter())
    }

    /// Number of photos the materializer will try to copy
    pub fn total_photos(&self) -> usize {
        self.all_groups().map(|g| g.photo_count()).sum::<usize>() + self.ungrouped_photos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_at(t: f64) -> RecognitionRecord {
        RecognitionRecord {
            modified_time: t,
            ..Default::default()
        }
    }

    #[test]
    fn time_span_is_zero_for_single_photo() {
        let mut group = PhotoGroup::new("QR1", "Ana", "1A", 0);
        group.photos.push(photo_at(1_000.0));
        assert_eq!(group.time_span(), 0.0);
    }

    #[test]
    fn time_span_ignores_processing_order() {
        let mut group = PhotoGroup::new("QR1", "Ana", "1A", 0);
        group.photos.extend([photo_at(500.0), photo_at(100.0), photo_at(300.0)]);
        assert_eq!(group.time_span(), 400.0);
    }

    #[test]
    fn ungrouped_photo_serializes_flat_with_reason() {
        let photo = UngroupedPhoto {
            record: RecognitionRecord {
                file_name: "IMG_1.jpg".to_string(),
                ..Default::default()
            },
            reason: UngroupReason::NoQrDetected,
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["file_name"], "IMG_1.jpg");
        assert_eq!(json["reason"], "no_qr_detected");
    }
}
