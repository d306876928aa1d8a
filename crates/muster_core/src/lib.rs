//! Core domain logic for muster attendance tracking.
//! This crate is the single source of truth for roster and presence invariants.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use import::roster_csv::{parse_roster_csv, CsvError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{Event, EventId};
pub use model::person::{
    normalize_lifeboat, CheckinMode, CheckinRequest, NewPerson, Person, PersonId, RosterRow,
    RowValidationError,
};
pub use model::summary::{LifeboatSummary, Summary};
pub use notify::{FanoutNotifier, NoopNotifier, SnapshotNotifier, SummaryNotifier};
pub use repo::attendance_repo::{
    AttendanceRepository, CheckinOutcome, ImportReport, RepoError, RepoResult,
    SqliteAttendanceRepository,
};
pub use service::attendance_service::AttendanceService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
