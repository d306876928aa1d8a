//! Attendance use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for event, roster and check-in flows.
//! - Fan out summary-changed notifications after successful check-ins.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or locking.
//! - The notifier runs after the repository call returns, never under the
//!   repository lock.

use crate::model::event::{Event, EventId};
use crate::model::person::{CheckinRequest, Person, RosterRow};
use crate::model::summary::Summary;
use crate::notify::{NoopNotifier, SummaryNotifier};
use crate::repo::attendance_repo::{
    AttendanceRepository, CheckinOutcome, ImportReport, RepoError, RepoResult,
};
use log::{info, warn};
use std::sync::Arc;

/// Use-case facade over an attendance repository.
pub struct AttendanceService<R: AttendanceRepository> {
    repo: R,
    notifier: Arc<dyn SummaryNotifier>,
}

impl<R: AttendanceRepository> AttendanceService<R> {
    /// Creates a service that drops summary notifications.
    pub fn new(repo: R) -> Self {
        Self::with_notifier(repo, Arc::new(NoopNotifier))
    }

    /// Creates a service that reports check-in summaries to `notifier`.
    pub fn with_notifier(repo: R, notifier: Arc<dyn SummaryNotifier>) -> Self {
        Self { repo, notifier }
    }

    /// Creates an event with an empty roster.
    pub fn create_event(&self) -> RepoResult<EventId> {
        let event_id = self.repo.create_event()?;
        info!("event=event_create module=service status=ok event_id={event_id}");
        Ok(event_id)
    }

    pub fn list_events(&self) -> RepoResult<Vec<Event>> {
        self.repo.list_events()
    }

    /// Appends valid roster rows to an event.
    ///
    /// Rows with a blank name or lifeboat are skipped and only counted.
    pub fn import_roster(&self, event_id: EventId, rows: &[RosterRow]) -> RepoResult<ImportReport> {
        match self.repo.import_roster(event_id, rows) {
            Ok(report) => {
                info!(
                    "event=roster_import module=service status=ok event_id={} rows={} imported={} skipped={}",
                    event_id,
                    rows.len(),
                    report.imported,
                    report.skipped
                );
                Ok(report)
            }
            Err(err) => {
                warn!(
                    "event=roster_import module=service status=error event_id={} rows={} error={}",
                    event_id,
                    rows.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Sets presence for the matching crew member and notifies subscribers.
    ///
    /// # Contract
    /// - Matches lifeboat and name/nickname case-insensitively.
    /// - First match in roster order wins.
    /// - The notifier receives the post-write summary exactly once.
    pub fn mark_present(
        &self,
        event_id: EventId,
        request: &CheckinRequest,
    ) -> RepoResult<CheckinOutcome> {
        let outcome = match self.repo.mark_present(event_id, request) {
            Ok(outcome) => outcome,
            Err(err) => {
                let error_code = match &err {
                    RepoError::EventNotFound(_) => "event_not_found",
                    RepoError::PersonNotFound { .. } => "person_not_found",
                    _ => "storage",
                };
                warn!(
                    "event=checkin module=service status=error event_id={} mode={} error_code={} error={}",
                    event_id,
                    request.mode.as_str(),
                    error_code,
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=checkin module=service status=ok event_id={} person_id={} lifeboat={} present={} mode={}",
            event_id,
            outcome.person.id,
            outcome.person.lifeboat,
            outcome.person.present,
            request.mode.as_str()
        );
        self.notifier.summary_changed(&outcome.summary);
        Ok(outcome)
    }

    pub fn compute_summary(&self, event_id: EventId) -> RepoResult<Summary> {
        self.repo.compute_summary(event_id)
    }

    pub fn list_persons(&self, event_id: EventId) -> RepoResult<Vec<Person>> {
        self.repo.list_persons(event_id)
    }

    /// Looks up a crew member by registration number (matrícula).
    pub fn find_by_registration(
        &self,
        event_id: EventId,
        registration: &str,
    ) -> RepoResult<Option<Person>> {
        self.repo.find_by_registration(event_id, registration)
    }

    /// Returns the crew member most recently marked present.
    pub fn latest_checkin(&self, event_id: EventId) -> RepoResult<Option<Person>> {
        self.repo.latest_checkin(event_id)
    }
}
