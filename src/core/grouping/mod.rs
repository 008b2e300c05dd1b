//! # Grouping Module
//!
//! Assigns recognition records to roster participants with a sequential
//! scan, then scores each group and prepares review hints.
//!
//! ## Scan rules
//! | Record                     | Effect                                         |
//! |----------------------------|------------------------------------------------|
//! | roster payload, new        | close active group, open one for this payload  |
//! | roster payload, same       | append to active group                         |
//! | payload not on roster      | ungrouped (`unknown_qr_code`), active kept     |
//! | no payload, group active   | append to active group                         |
//! | no payload, none active    | ungrouped (`no_qr_detected`)                   |
//!
//! A payload that comes back after another participant's sequence opens a new
//! run. The new run becomes the entry in [`GroupingResult::groups`]; earlier
//! runs move to [`GroupingResult::superseded_groups`] so none of their photos
//! are lost.

mod analysis;
mod engine;
mod scoring;
mod types;

pub use analysis::{LOW_CONFIDENCE_THRESHOLD, OVERSIZED_GROUP_THRESHOLD};
pub use engine::GroupingEngine;
pub use scoring::{confidence_score, LONG_RUN_FACTOR, LONG_RUN_SECONDS, SIZE_SATURATION};
pub use types::*;

use crate::core::recognition::RecognitionRecord;
use crate::core::roster::{ParticipantEntry, ParticipantRoster};
use crate::events::EventSender;
use serde::Serialize;

/// Grouping outcome with an explicit success flag, as handed to callers
/// that only speak JSON
#[derive(Debug, Clone, Serialize)]
pub struct GroupingReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub result: Option<GroupingResult>,
}

impl GroupingReport {
    pub fn success(result: GroupingResult) -> Self {
        Self {
            success: true,
            error: None,
            result: Some(result),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            result: None,
        }
    }
}

/// Validate the raw roster and group `records`.
///
/// A roster that cannot be built turns into a failed report rather than an
/// error, so nothing crosses this boundary except the report.
pub fn group_photos(
    records: &[RecognitionRecord],
    participants: Vec<ParticipantEntry>,
    events: &EventSender,
) -> GroupingReport {
    match ParticipantRoster::from_entries(participants) {
        Ok(roster) => GroupingReport::success(
            GroupingEngine::new(&roster)
                .with_events(events.clone())
                .group(records),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Error grouping photos");
            GroupingReport::failure(e.to_string())
        }
    }
}
