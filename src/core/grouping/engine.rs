//! The sequential grouping scan.
//!
//! Records are consumed in the order given. A roster payload opens a group
//! for that participant; photos without a payload join whichever group is
//! active; payloads not on the roster are set aside without interrupting the
//! active group.

use super::analysis;
use super::scoring::confidence_score;
use super::types::*;
use crate::core::recognition::RecognitionRecord;
use crate::core::roster::{Participant, ParticipantRoster};
use crate::events::{null_sender, Event, EventSender, GroupingEvent};
use std::collections::{BTreeMap, HashMap};

/// Groups recognition records by participant
pub struct GroupingEngine<'a> {
    roster: &'a ParticipantRoster,
    events: EventSender,
}

/// Mutable state of one scan
#[derive(Default)]
struct ScanState {
    /// Every run opened, in stream order
    runs: Vec<PhotoGroup>,
    /// Payload → index of its latest run
    latest: HashMap<String, usize>,
    active: Option<usize>,
    ungrouped: Vec<UngroupedPhoto>,
}

impl ScanState {
    fn is_active(&self, code: &str) -> bool {
        self.active.is_some_and(|i| self.runs[i].qr_code == code)
    }

    /// Close the active run and open a new one for `participant`.
    ///
    /// Returns whether the payload had been seen before.
    fn open(&mut self, participant: &Participant) -> bool {
        let run_index = self
            .runs
            .iter()
            .filter(|g| g.qr_code == participant.qr_code)
            .count();

        let index = self.runs.len();
        self.runs.push(PhotoGroup::new(
            participant.qr_code.clone(),
            participant.name.clone(),
            participant.turma.clone(),
            run_index,
        ));
        self.active = Some(index);
        self.latest
            .insert(participant.qr_code.clone(), index)
            .is_some()
    }

    fn set_aside(&mut self, record: &RecognitionRecord, reason: UngroupReason) {
        self.ungrouped.push(UngroupedPhoto {
            record: record.clone(),
            reason,
        });
    }
}

impl<'a> GroupingEngine<'a> {
    pub fn new(roster: &'a ParticipantRoster) -> Self {
        Self {
            roster,
            events: null_sender(),
        }
    }

    /// Report progress through `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Run the scan over `records` in their given order
    pub fn group(&self, records: &[RecognitionRecord]) -> GroupingResult {
        tracing::info!(count = records.len(), "Grouping photos");
        self.events.send(Event::Grouping(GroupingEvent::Started {
            total_records: records.len(),
        }));

        let mut state = ScanState::default();

        for record in records {
            match record.payload() {
                Some(code) => match self.roster.get(code) {
                    Some(participant) => {
                        if !state.is_active(code) {
                            let reopened = state.open(participant);
                            if reopened {
                                tracing::warn!(
                                    qr_code = code,
                                    file = %record.file_name,
                                    "Participant reappeared after another sequence"
                                );
                            }
                            self.events.send(Event::Grouping(GroupingEvent::GroupOpened {
                                qr_code: code.to_string(),
                                participant_name: participant.name.clone(),
                                reopened,
                            }));
                        }
                        if let Some(i) = state.active {
                            state.runs[i].photos.push(record.clone());
                        }
                    }
                    None => {
                        tracing::warn!(qr_code = code, file = %record.file_name, "Unknown QR code detected");
                        self.events.send(Event::Grouping(GroupingEvent::UnknownCode {
                            file_name: record.file_name.clone(),
                            code: code.to_string(),
                        }));
                        state.set_aside(record, UngroupReason::UnknownQrCode);
                    }
                },
                None => match state.active {
                    Some(i) => state.runs[i].photos.push(record.clone()),
                    None => state.set_aside(record, UngroupReason::NoQrDetected),
                },
            }
        }

        let result = self.finish(state);

        tracing::info!(
            groups = result.groups.len(),
            superseded = result.superseded_groups.len(),
            ungrouped = result.ungrouped_photos.len(),
            "Grouping complete"
        );
        self.events.send(Event::Grouping(GroupingEvent::Completed {
            total_groups: result.statistics.total_groups,
            ungrouped_photos: result.ungrouped_photos.len(),
        }));

        result
    }

    fn finish(&self, state: ScanState) -> GroupingResult {
        let ScanState {
            mut runs,
            latest,
            ungrouped,
            ..
        } = state;

        for run in &mut runs {
            run.confidence_score = confidence_score(run);
            run.time_span_seconds = run.time_span();
        }

        let statistics = analysis::statistics(&runs, &ungrouped, self.roster.len());
        let suggestions = analysis::suggestions(&runs, &ungrouped);

        let mut groups = BTreeMap::new();
        let mut superseded_groups = Vec::new();
        for (index, run) in runs.into_iter().enumerate() {
            if run.photos.is_empty() {
                continue;
            }
            if latest.get(&run.qr_code) == Some(&index) {
                groups.insert(run.qr_code.clone(), run);
            } else {
                superseded_groups.push(run);
            }
        }

        GroupingResult {
            groups,
            superseded_groups,
            ungrouped_photos: ungrouped,
            statistics,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;

    fn roster(codes: &[&str]) -> ParticipantRoster {
        ParticipantRoster::from_participants(
            codes
                .iter()
                .map(|c| Participant::new(format!("Name {}", c), "1A", *c)),
        )
    }

    fn qr(code: &str, name: &str) -> RecognitionRecord {
        RecognitionRecord {
            found: true,
            code: Some(code.to_string()),
            file_name: name.to_string(),
            file_path: format!("/src/{}", name),
            ..Default::default()
        }
    }

    fn plain(name: &str) -> RecognitionRecord {
        RecognitionRecord {
            file_name: name.to_string(),
            file_path: format!("/src/{}", name),
            ..Default::default()
        }
    }

    fn names(group: &PhotoGroup) -> Vec<&str> {
        group.photos.iter().map(|p| p.file_name.as_str()).collect()
    }

    #[test]
    fn no_code_photos_follow_the_active_participant() {
        let roster = roster(&["A", "B"]);
        let records = vec![qr("A", "1"), plain("2"), plain("3"), qr("B", "4"), plain("5")];

        let result = GroupingEngine::new(&roster).group(&records);

        assert_eq!(result.groups.len(), 2);
        assert_eq!(names(&result.groups["A"]), vec!["1", "2", "3"]);
        assert_eq!(names(&result.groups["B"]), vec!["4", "5"]);
        assert!(result.ungrouped_photos.is_empty());
    }

    #[test]
    fn leading_no_code_photos_are_ungrouped() {
        let roster = roster(&["A"]);
        let result = GroupingEngine::new(&roster).group(&[plain("1"), plain("2")]);

        assert!(result.groups.is_empty());
        assert_eq!(result.ungrouped_photos.len(), 2);
        assert!(result
            .ungrouped_photos
            .iter()
            .all(|u| u.reason == UngroupReason::NoQrDetected));
    }

    #[test]
    fn unknown_code_does_not_interrupt_active_group() {
        let roster = roster(&["A"]);
        let records = vec![qr("A", "1"), qr("Z", "2"), plain("3")];

        let result = GroupingEngine::new(&roster).group(&records);

        assert_eq!(names(&result.groups["A"]), vec!["1", "3"]);
        assert_eq!(result.ungrouped_photos.len(), 1);
        assert_eq!(result.ungrouped_photos[0].reason, UngroupReason::UnknownQrCode);
        assert_eq!(result.suggestions.ungrouped_with_qr[0].detected_qr, "Z");
    }

    #[test]
    fn repeated_code_continues_same_group() {
        let roster = roster(&["A"]);
        let records = vec![qr("A", "1"), plain("2"), qr("A", "3")];

        let result = GroupingEngine::new(&roster).group(&records);

        assert_eq!(result.groups["A"].photo_count(), 3);
        assert!(result.superseded_groups.is_empty());
    }

    #[test]
    fn reappearing_code_supersedes_without_losing_photos() {
        let roster = roster(&["A", "B"]);
        let records = vec![qr("A", "1"), plain("2"), qr("B", "3"), qr("A", "4"), plain("5")];

        let result = GroupingEngine::new(&roster).group(&records);

        let latest = &result.groups["A"];
        assert_eq!(latest.run_index, 1);
        assert_eq!(names(latest), vec!["4", "5"]);

        assert_eq!(result.superseded_groups.len(), 1);
        assert_eq!(result.superseded_groups[0].run_index, 0);
        assert_eq!(names(&result.superseded_groups[0]), vec!["1", "2"]);

        assert_eq!(result.statistics.grouped_photos, 5);
        assert_eq!(result.statistics.participants_with_photos, 2);
        assert_eq!(result.suggestions.repeated_participants.len(), 1);
    }

    #[test]
    fn found_without_code_is_treated_as_no_code() {
        let roster = roster(&["A"]);
        let odd = RecognitionRecord {
            found: true,
            code: None,
            file_name: "2".to_string(),
            ..Default::default()
        };

        let result = GroupingEngine::new(&roster).group(&[qr("A", "1"), odd]);

        assert_eq!(result.groups["A"].photo_count(), 2);
    }

    #[test]
    fn groups_are_scored_and_never_empty() {
        let roster = roster(&["A", "B", "C"]);
        let records: Vec<_> = (0..12).map(|i| qr("A", &i.to_string())).collect();

        let result = GroupingEngine::new(&roster).group(&records);

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups["A"].confidence_score, 1.0);
        assert!(result.all_groups().all(|g| !g.photos.is_empty()));
        assert_eq!(result.statistics.participants_without_photos, 2);
    }

    #[test]
    fn engine_reports_through_injected_sender() {
        let roster = roster(&["A"]);
        let (sender, receiver) = EventChannel::new();

        GroupingEngine::new(&roster)
            .with_events(sender)
            .group(&[qr("A", "1"), qr("Q", "2")]);

        let events = receiver.drain();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Grouping(GroupingEvent::GroupOpened { reopened: false, .. })
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Grouping(GroupingEvent::UnknownCode { .. }))));
        assert!(matches!(
            events.last(),
            Some(Event::Grouping(GroupingEvent::Completed { total_groups: 1, ungrouped_photos: 1 }))
        ));
    }
}
