use muster_core::{
    AttendanceService, CheckinRequest, FanoutNotifier, RepoError, RosterRow, SnapshotNotifier,
    SqliteAttendanceRepository, Summary, SummaryNotifier,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingNotifier {
    summaries: Mutex<Vec<Summary>>,
}

impl RecordingNotifier {
    fn take(&self) -> Vec<Summary> {
        std::mem::take(&mut *self.summaries.lock().unwrap())
    }
}

impl SummaryNotifier for RecordingNotifier {
    fn summary_changed(&self, summary: &Summary) {
        self.summaries.lock().unwrap().push(summary.clone());
    }
}

fn service_with(
    notifier: Arc<dyn SummaryNotifier>,
) -> AttendanceService<SqliteAttendanceRepository> {
    let repo = SqliteAttendanceRepository::open_in_memory().unwrap();
    AttendanceService::with_notifier(repo, notifier)
}

#[test]
fn successful_checkin_notifies_once_with_post_write_summary() {
    let recorder = Arc::new(RecordingNotifier::default());
    let service = service_with(recorder.clone());
    let event_id = service.create_event().unwrap();
    service
        .import_roster(
            event_id,
            &[
                RosterRow::new("Ana Silva", "b3"),
                RosterRow::new("Bruno Dias", "B3").with_nickname("Bruninho"),
            ],
        )
        .unwrap();

    service
        .mark_present(event_id, &CheckinRequest::new("Bruninho", "b3", true))
        .unwrap();

    let published = recorder.take();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0], service.compute_summary(event_id).unwrap());
    assert_eq!(published[0].present, 1);
}

#[test]
fn failed_checkin_does_not_notify() {
    let recorder = Arc::new(RecordingNotifier::default());
    let service = service_with(recorder.clone());
    let event_id = service.create_event().unwrap();

    let err = service
        .mark_present(event_id, &CheckinRequest::new("Nobody", "B1", true))
        .unwrap_err();
    assert!(matches!(err, RepoError::PersonNotFound { .. }));
    let err = service
        .mark_present(event_id + 1, &CheckinRequest::new("Nobody", "B1", true))
        .unwrap_err();
    assert!(matches!(err, RepoError::EventNotFound(_)));

    assert!(recorder.take().is_empty());
}

#[test]
fn roster_import_does_not_notify() {
    let recorder = Arc::new(RecordingNotifier::default());
    let service = service_with(recorder.clone());
    let event_id = service.create_event().unwrap();
    service
        .import_roster(event_id, &[RosterRow::new("Ana", "B1")])
        .unwrap();
    assert!(recorder.take().is_empty());
}

#[test]
fn snapshot_notifier_writes_latest_summary_per_event() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = Arc::new(SnapshotNotifier::new(dir.path().join("data")));
    let recorder = Arc::new(RecordingNotifier::default());
    let fanout = FanoutNotifier::new()
        .with(snapshots.clone())
        .with(recorder.clone());
    let service = service_with(Arc::new(fanout));

    let event_id = service.create_event().unwrap();
    service
        .import_roster(
            event_id,
            &[RosterRow::new("Ana", "B1"), RosterRow::new("Caio", "B2")],
        )
        .unwrap();
    service
        .mark_present(event_id, &CheckinRequest::new("ana", "b1", true))
        .unwrap();
    service
        .mark_present(event_id, &CheckinRequest::new("caio", "b2", true))
        .unwrap();

    let path = snapshots.snapshot_path(event_id);
    assert!(path.ends_with(format!("event_{event_id}_summary.json")));
    let stored: Summary = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(stored.present, 2);
    assert_eq!(stored.absent, 0);
    assert_eq!(recorder.take().len(), 2);
}
