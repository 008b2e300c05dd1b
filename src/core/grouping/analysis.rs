//! Statistics and manual-review suggestions over finished groups.

use super::types::*;
use std::collections::{BTreeMap, HashSet};

/// Below this score a group is worth a second look
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;
/// Above this many photos a run probably swallowed the next participant
pub const OVERSIZED_GROUP_THRESHOLD: usize = 50;

pub fn statistics(
    runs: &[PhotoGroup],
    ungrouped: &[UngroupedPhoto],
    roster_size: usize,
) -> GroupingStatistics {
    let sizes: Vec<usize> = runs
        .iter()
        .map(|g| g.photo_count())
        .filter(|&n| n > 0)
        .collect();

    let grouped_photos: usize = sizes.iter().sum();
    let total_photos = grouped_photos + ungrouped.len();

    let participants_with_photos = runs
        .iter()
        .filter(|g| g.photo_count() > 0)
        .map(|g| g.qr_code.as_str())
        .collect::<HashSet<_>>()
        .len();

    GroupingStatistics {
        total_photos,
        grouped_photos,
        ungrouped_photos: ungrouped.len(),
        grouping_success_rate: if total_photos > 0 {
            grouped_photos as f64 / total_photos as f64 * 100.0
        } else {
            0.0
        },
        total_participants: roster_size,
        participants_with_photos,
        participants_without_photos: roster_size.saturating_sub(participants_with_photos),
        total_groups: sizes.len(),
        average_group_size: if sizes.is_empty() {
            0.0
        } else {
            grouped_photos as f64 / sizes.len() as f64
        },
        largest_group_size: sizes.iter().copied().max().unwrap_or(0),
    }
}

pub fn suggestions(runs: &[PhotoGroup], ungrouped: &[UngroupedPhoto]) -> Suggestions {
    let low_confidence_groups = runs
        .iter()
        .filter(|g| g.photo_count() > 0 && g.confidence_score < LOW_CONFIDENCE_THRESHOLD)
        .map(|g| LowConfidenceGroup {
            qr_code: g.qr_code.clone(),
            participant_name: g.participant_name.clone(),
            run_index: g.run_index,
            confidence: g.confidence_score,
            photo_count: g.photo_count(),
        })
        .collect();

    let ungrouped_with_qr = ungrouped
        .iter()
        .filter_map(|u| {
            u.record.payload().map(|code| UngroupedWithQr {
                file_name: u.record.file_name.clone(),
                detected_qr: code.to_string(),
                reason: u.reason,
            })
        })
        .collect();

    let oversized_groups = runs
        .iter()
        .filter(|g| g.photo_count() > OVERSIZED_GROUP_THRESHOLD)
        .map(|g| OversizedGroup {
            qr_code: g.qr_code.clone(),
            participant_name: g.participant_name.clone(),
            run_index: g.run_index,
            photo_count: g.photo_count(),
            time_span_hours: g.time_span() / 3600.0,
        })
        .collect();

    let mut by_code: BTreeMap<&str, RepeatedParticipant> = BTreeMap::new();
    for g in runs.iter().filter(|g| g.photo_count() > 0) {
        let entry = by_code.entry(g.qr_code.as_str()).or_insert_with(|| RepeatedParticipant {
            qr_code: g.qr_code.clone(),
            participant_name: g.participant_name.clone(),
            runs: 0,
            photo_count: 0,
        });
        entry.runs += 1;
        entry.photo_count += g.photo_count();
    }
    let repeated_participants = by_code.into_values().filter(|r| r.runs > 1).collect();

    Suggestions {
        low_confidence_groups,
        ungrouped_with_qr,
        oversized_groups,
        repeated_participants,
    }
}
