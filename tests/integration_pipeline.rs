use assert_fs::prelude::*;
use predicates::prelude::*;
use roster_sort::core::grouping::UngroupReason;
use roster_sort::core::materialize::UNASSIGNED_FOLDER;
use roster_sort::core::pipeline::{JobConfig, JobReport, Pipeline};
use roster_sort::events::{Event, EventChannel, GroupingEvent, PipelineEvent};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// A session folder with one detections file describing it
struct Session {
    root: assert_fs::TempDir,
}

impl Session {
    fn new() -> Self {
        Self {
            root: assert_fs::TempDir::new().unwrap(),
        }
    }

    fn source(&self) -> std::path::PathBuf {
        self.root.child("photos").path().to_path_buf()
    }

    fn destination(&self) -> std::path::PathBuf {
        self.root.child("sorted").path().to_path_buf()
    }

    /// Write photos and a detections file; `None` means no QR was read.
    /// Modification times are spaced one second apart.
    fn write(&self, photos: &[(&str, Option<&str>)]) {
        let source = self.root.child("photos");
        source.create_dir_all().unwrap();

        let results: Vec<Value> = photos
            .iter()
            .enumerate()
            .map(|(i, (name, code))| {
                let photo = source.child(name);
                photo.write_str(&format!("jpeg {}", name)).unwrap();
                let (confidence, method) = match code {
                    Some(_) => (1.0, "standard"),
                    None => (0.0, "No QR code detected"),
                };
                json!({
                    "found": code.is_some(),
                    "code": code,
                    "file_path": photo.path().display().to_string(),
                    "file_name": name,
                    "file_size": 10,
                    "modified_time": 1_700_000_000.0 + i as f64,
                    "confidence": confidence,
                    "method": method,
                })
            })
            .collect();

        self.root
            .child("detection_results.json")
            .write_str(&json!({ "success": true, "results": results }).to_string())
            .unwrap();
    }

    fn job(&self, participants: Value) -> JobConfig {
        serde_json::from_value(json!({
            "source_folder": self.source(),
            "destination_folder": self.destination(),
            "detections_file": self.root.child("detection_results.json").path(),
            "participants": participants,
        }))
        .unwrap()
    }

    fn run(&self, participants: Value) -> JobReport {
        Pipeline::builder().job(self.job(participants)).build().run()
    }
}

fn roster_ab() -> Value {
    json!([
        {"name": "Ana Silva", "turma": "1A", "qrCode": "A"},
        {"name": "Bruno Costa", "turma": "1B", "qrCode": "B"},
    ])
}

fn photo_names(report: &JobReport, code: &str) -> Vec<String> {
    report.grouping_result().unwrap().groups[code]
        .photos
        .iter()
        .map(|p| p.file_name.clone())
        .collect()
}

#[test]
fn scenario_a_unread_photos_follow_the_last_participant() {
    let session = Session::new();
    session.write(&[
        ("IMG_01.jpg", Some("A")),
        ("IMG_02.jpg", None),
        ("IMG_03.jpg", None),
        ("IMG_04.jpg", Some("B")),
        ("IMG_05.jpg", None),
    ]);

    let report = session.run(roster_ab());

    assert!(report.success);
    assert_eq!(photo_names(&report, "A"), vec!["IMG_01.jpg", "IMG_02.jpg", "IMG_03.jpg"]);
    assert_eq!(photo_names(&report, "B"), vec!["IMG_04.jpg", "IMG_05.jpg"]);
    assert!(report.grouping_result().unwrap().ungrouped_photos.is_empty());

    let sorted = assert_fs::fixture::ChildPath::new(session.destination());
    sorted
        .child("1A/Ana Silva - A/IMG_03_qrA.jpg")
        .assert(predicate::path::is_file());
    sorted
        .child("1B/Bruno Costa - B/IMG_05_qrB.jpg")
        .assert(predicate::str::contains("jpeg IMG_05.jpg"));
    sorted.child(UNASSIGNED_FOLDER).assert(predicate::path::missing());
}

#[test]
fn scenario_b_leading_unread_photos_are_unassigned() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", None), ("IMG_02.jpg", None)]);

    let report = session.run(roster_ab());

    let grouping = report.grouping_result().unwrap();
    assert!(grouping.groups.is_empty());
    assert!(grouping
        .ungrouped_photos
        .iter()
        .all(|u| u.reason == UngroupReason::NoQrDetected));

    let unassigned = assert_fs::fixture::ChildPath::new(session.destination().join(UNASSIGNED_FOLDER));
    unassigned.child("IMG_01.jpg").assert(predicate::path::exists());
    unassigned.child("IMG_02.jpg").assert(predicate::path::exists());
}

#[test]
fn scenario_c_unknown_code_keeps_the_active_participant() {
    let session = Session::new();
    session.write(&[
        ("IMG_01.jpg", Some("A")),
        ("IMG_02.jpg", Some("Z")),
        ("IMG_03.jpg", None),
    ]);

    let report = session.run(json!([{"name": "Ana", "turma": "1A", "qrCode": "A"}]));

    assert_eq!(photo_names(&report, "A"), vec!["IMG_01.jpg", "IMG_03.jpg"]);
    let grouping = report.grouping_result().unwrap();
    assert_eq!(grouping.ungrouped_photos.len(), 1);
    assert_eq!(grouping.ungrouped_photos[0].reason, UngroupReason::UnknownQrCode);
    assert_eq!(grouping.suggestions.ungrouped_with_qr[0].detected_qr, "Z");

    let copying = report.copying.unwrap();
    let unassigned = copying
        .copied_files
        .iter()
        .find(|c| c.reason.is_some())
        .unwrap();
    assert_eq!(unassigned.reason, Some(UngroupReason::UnknownQrCode));
    assert!(unassigned.destination_path.ends_with("IMG_02.jpg"));
}

#[test]
fn scenario_d_fully_detected_dozen_scores_one() {
    let session = Session::new();
    let names: Vec<String> = (1..=12).map(|i| format!("IMG_{:02}.jpg", i)).collect();
    let photos: Vec<(&str, Option<&str>)> = names.iter().map(|n| (n.as_str(), Some("A"))).collect();
    session.write(&photos);

    let report = session.run(roster_ab());

    let group = &report.grouping_result().unwrap().groups["A"];
    assert_eq!(group.photo_count(), 12);
    assert_eq!(group.confidence_score, 1.0);
    assert!(report.grouping_result().unwrap().suggestions.low_confidence_groups.is_empty());
}

#[test]
fn scenario_e_classroom_slash_becomes_underscore() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", Some("QR7"))]);

    let report = session.run(json!([{"name": "Ana", "turma": "3º Ano A/B", "qrCode": "QR7"}]));

    assert!(report.copying.as_ref().unwrap().success);
    session
        .root
        .child("sorted/3º Ano A_B/Ana - QR7/IMG_01_qr7.jpg")
        .assert(predicate::path::is_file());
}

#[test]
fn scenario_f_missing_source_is_one_error_and_the_rest_copy() {
    let session = Session::new();
    session.write(&[
        ("IMG_01.jpg", Some("A")),
        ("IMG_02.jpg", None),
        ("IMG_03.jpg", None),
    ]);
    fs::remove_file(session.source().join("IMG_02.jpg")).unwrap();

    let report = session.run(roster_ab());

    let copying = report.copying.unwrap();
    assert_eq!(copying.errors.len(), 1);
    assert_eq!(copying.summary.total_errors, 1);
    assert_eq!(copying.errors[0].subject(), "IMG_02.jpg");
    assert_eq!(copying.summary.total_copied, 2);
    assert!(copying.success);

    let folder = session.root.child("sorted/1A/Ana Silva - A");
    folder.child("IMG_01_qrA.jpg").assert(predicate::path::exists());
    folder.child("IMG_03_qrA.jpg").assert(predicate::path::exists());
}

#[test]
fn reappearing_participant_keeps_both_runs_on_disk() {
    let session = Session::new();
    session.write(&[
        ("IMG_01.jpg", Some("A")),
        ("IMG_02.jpg", Some("B")),
        ("IMG_03.jpg", Some("A")),
        ("IMG_04.jpg", None),
    ]);

    let report = session.run(roster_ab());

    let grouping = report.grouping_result().unwrap();
    assert_eq!(grouping.groups["A"].run_index, 1);
    assert_eq!(grouping.superseded_groups.len(), 1);
    assert_eq!(grouping.suggestions.repeated_participants[0].runs, 2);

    let folder = session.root.child("sorted/1A/Ana Silva - A");
    for name in ["IMG_01_qrA.jpg", "IMG_03_qrA.jpg", "IMG_04_qrA.jpg"] {
        folder.child(name).assert(predicate::path::exists());
    }
}

#[test]
fn sources_are_never_modified() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", Some("A")), ("IMG_02.jpg", None)]);
    let before = fs::read(session.source().join("IMG_02.jpg")).unwrap();

    session.run(roster_ab());

    let source = session.root.child("photos");
    source.child("IMG_01.jpg").assert(predicate::path::exists());
    assert_eq!(fs::read(session.source().join("IMG_02.jpg")).unwrap(), before);
}

#[test]
fn invalid_roster_fails_the_job_with_its_message() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", Some("A"))]);

    let report = session.run(json!([{"name": "Ana", "qrCode": "A"}]));

    assert!(!report.success);
    assert!(report
        .error
        .as_deref()
        .unwrap()
        .contains("Participant 1 missing field: turma"));
    assert!(!Path::new(&session.destination()).exists());
}

#[test]
fn job_report_serializes_for_the_host() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", Some("A")), ("IMG_02.jpg", None)]);

    let report = session.run(roster_ab());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["processing_summary"]["total_images"], 2);
    assert_eq!(json["processing_summary"]["qr_detection_rate"], 50.0);
    assert_eq!(json["grouping"]["success"], true);
    assert_eq!(json["grouping"]["groups"]["A"]["photos"][1]["file_name"], "IMG_02.jpg");
    assert_eq!(json["copying"]["summary"]["total_copied"], 2);
    assert!(json["job_id"].is_string());
}

#[test]
fn events_describe_the_whole_job() {
    let session = Session::new();
    session.write(&[("IMG_01.jpg", Some("A")), ("IMG_02.jpg", Some("Z"))]);
    let (sender, receiver) = EventChannel::new();

    Pipeline::builder()
        .job(session.job(roster_ab()))
        .build()
        .run_with_events(&sender);

    let events = receiver.drain();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Grouping(GroupingEvent::UnknownCode { code, .. }) if code == "Z")));
    match events.last() {
        Some(Event::Pipeline(PipelineEvent::Completed { summary })) => {
            assert_eq!(summary.total_images, 2);
            assert_eq!(summary.files_copied, 2);
        }
        other => panic!("unexpected last event: {:?}", other),
    }
}
