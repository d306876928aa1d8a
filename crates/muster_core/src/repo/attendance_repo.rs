//! Attendance repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own all event and roster state behind one synchronized connection.
//! - Apply roster imports, presence writes and summary aggregation.
//!
//! # Invariants
//! - Every operation holds the connection lock for its whole duration, so
//!   readers observe either the pre- or post-state of a write.
//! - Imports are applied in one transaction.
//! - Failed operations leave state untouched.

use crate::db::{open_db_in_memory, DbError};
use crate::model::event::{Event, EventId};
use crate::model::person::{
    eq_ignore_case, normalize_lifeboat, CheckinMode, CheckinRequest, Person, PersonId, RosterRow,
};
use crate::model::summary::{LifeboatSummary, Summary};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    event_id,
    name,
    nickname,
    lifeboat,
    company,
    registration,
    cabin,
    bunk,
    present,
    checkin_mode,
    checked_in_at
FROM persons";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for attendance operations.
#[derive(Debug)]
pub enum RepoError {
    /// Referenced event id has no corresponding event.
    EventNotFound(EventId),
    /// No roster entry matches the supplied identifier and lifeboat.
    PersonNotFound {
        event_id: EventId,
        identifier: String,
        lifeboat: String,
    },
    Db(DbError),
    InvalidData(String),
    /// A previous holder of the connection lock panicked.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::PersonNotFound {
                event_id,
                identifier,
                lifeboat,
            } => write!(
                f,
                "no crew member `{identifier}` found in lifeboat `{lifeboat}` for event {event_id}"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored roster data: {message}"),
            Self::LockPoisoned => write!(f, "attendance store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of one roster import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows appended to the roster.
    pub imported: usize,
    /// Rows dropped for a blank name or lifeboat.
    pub skipped: usize,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinOutcome {
    /// Person after the presence write.
    pub person: Person,
    /// Event summary computed in the same critical section as the write.
    pub summary: Summary,
}

/// Repository interface for event, roster and presence operations.
pub trait AttendanceRepository: Send + Sync {
    fn create_event(&self) -> RepoResult<EventId>;
    fn list_events(&self) -> RepoResult<Vec<Event>>;
    fn import_roster(&self, event_id: EventId, rows: &[RosterRow]) -> RepoResult<ImportReport>;
    fn mark_present(
        &self,
        event_id: EventId,
        request: &CheckinRequest,
    ) -> RepoResult<CheckinOutcome>;
    fn compute_summary(&self, event_id: EventId) -> RepoResult<Summary>;
    fn list_persons(&self, event_id: EventId) -> RepoResult<Vec<Person>>;
    fn find_by_registration(
        &self,
        event_id: EventId,
        registration: &str,
    ) -> RepoResult<Option<Person>>;
    fn latest_checkin(&self, event_id: EventId) -> RepoResult<Option<Person>>;
}

/// SQLite-backed attendance repository guarded by a single mutex.
pub struct SqliteAttendanceRepository {
    conn: Mutex<Connection>,
}

impl SqliteAttendanceRepository {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens a fresh in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl AttendanceRepository for SqliteAttendanceRepository {
    fn create_event(&self) -> RepoResult<EventId> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO events DEFAULT VALUES;", [])?;
        Ok(conn.last_insert_rowid())
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.created_at, COUNT(p.id) AS headcount
             FROM events e
             LEFT JOIN persons p ON p.event_id = e.id
             GROUP BY e.id
             ORDER BY e.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(Event {
                id: row.get("id")?,
                created_at: row.get("created_at")?,
                headcount: count_column(row, "headcount")?,
            });
        }
        Ok(events)
    }

    fn import_roster(&self, event_id: EventId, rows: &[RosterRow]) -> RepoResult<ImportReport> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        ensure_event(&tx, event_id)?;

        let mut report = ImportReport::default();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO persons (
                    event_id,
                    name,
                    nickname,
                    lifeboat,
                    company,
                    registration,
                    cabin,
                    bunk
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for row in rows {
                let person = match row.normalize() {
                    Ok(person) => person,
                    Err(_) => {
                        report.skipped += 1;
                        continue;
                    }
                };
                stmt.execute(params![
                    event_id,
                    person.name,
                    person.nickname,
                    person.lifeboat,
                    person.company,
                    person.registration,
                    person.cabin,
                    person.bunk,
                ])?;
                report.imported += 1;
            }
        }
        tx.commit()?;

        Ok(report)
    }

    fn mark_present(
        &self,
        event_id: EventId,
        request: &CheckinRequest,
    ) -> RepoResult<CheckinOutcome> {
        let conn = self.conn()?;
        ensure_event(&conn, event_id)?;

        let lifeboat = normalize_lifeboat(&request.lifeboat);
        let mut stmt = conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE event_id = ?1 AND lifeboat = ?2
             ORDER BY id ASC;"
        ))?;
        // Roster order decides between duplicate matches.
        let mut candidates = stmt.query(params![event_id, lifeboat])?;
        let mut target: Option<PersonId> = None;
        while let Some(row) = candidates.next()? {
            let person = parse_person_row(row)?;
            if person.answers_to(&request.name_or_nick) {
                target = Some(person.id);
                break;
            }
        }
        drop(candidates);
        drop(stmt);

        let person_id = target.ok_or_else(|| RepoError::PersonNotFound {
            event_id,
            identifier: request.name_or_nick.trim().to_string(),
            lifeboat: lifeboat.clone(),
        })?;

        conn.execute(
            "UPDATE persons
             SET
                present = ?1,
                checkin_mode = ?2,
                checked_in_at = (strftime('%s', 'now') * 1000),
                checkin_seq = (SELECT COALESCE(MAX(checkin_seq), 0) + 1 FROM persons)
             WHERE id = ?3;",
            params![bool_to_int(request.present), request.mode.as_str(), person_id],
        )?;

        let person = get_person(&conn, person_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("person {person_id} vanished during check-in"))
        })?;
        let summary = summary_for(&conn, event_id)?;

        Ok(CheckinOutcome { person, summary })
    }

    fn compute_summary(&self, event_id: EventId) -> RepoResult<Summary> {
        let conn = self.conn()?;
        ensure_event(&conn, event_id)?;
        summary_for(&conn, event_id)
    }

    fn list_persons(&self, event_id: EventId) -> RepoResult<Vec<Person>> {
        let conn = self.conn()?;
        ensure_event(&conn, event_id)?;

        let mut stmt = conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE event_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([event_id])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }
        Ok(persons)
    }

    fn find_by_registration(
        &self,
        event_id: EventId,
        registration: &str,
    ) -> RepoResult<Option<Person>> {
        let conn = self.conn()?;
        ensure_event(&conn, event_id)?;

        let registration = registration.trim();
        if registration.is_empty() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE event_id = ?1 AND registration <> ''
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([event_id])?;
        while let Some(row) = rows.next()? {
            let person = parse_person_row(row)?;
            if eq_ignore_case(&person.registration, registration) {
                return Ok(Some(person));
            }
        }
        Ok(None)
    }

    fn latest_checkin(&self, event_id: EventId) -> RepoResult<Option<Person>> {
        let conn = self.conn()?;
        ensure_event(&conn, event_id)?;

        let mut stmt = conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE event_id = ?1 AND present = 1 AND checkin_seq IS NOT NULL
             ORDER BY checkin_seq DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([event_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }
}

fn ensure_event(conn: &Connection, event_id: EventId) -> RepoResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1);",
        [event_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(RepoError::EventNotFound(event_id))
    }
}

fn get_person(conn: &Connection, person_id: PersonId) -> RepoResult<Option<Person>> {
    let mut stmt = conn.prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([person_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_person_row(row)?));
    }
    Ok(None)
}

fn summary_for(conn: &Connection, event_id: EventId) -> RepoResult<Summary> {
    let mut stmt = conn.prepare(
        "SELECT
            lifeboat,
            COUNT(*) AS total,
            COALESCE(SUM(present), 0) AS present
         FROM persons
         WHERE event_id = ?1
         GROUP BY lifeboat
         ORDER BY lifeboat ASC;",
    )?;
    let mut rows = stmt.query([event_id])?;
    let mut groups = Vec::new();
    while let Some(row) = rows.next()? {
        groups.push(LifeboatSummary::new(
            row.get::<_, String>("lifeboat")?,
            count_column(row, "total")?,
            count_column(row, "present")?,
        ));
    }
    Ok(Summary::from_groups(event_id, groups))
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let present = match row.get::<_, i64>("present")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid present value `{other}` in persons.present"
            )));
        }
    };

    let checkin_mode = match row.get::<_, Option<String>>("checkin_mode")? {
        Some(value) => Some(CheckinMode::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid check-in mode `{value}` in persons.checkin_mode"
            ))
        })?),
        None => None,
    };

    Ok(Person {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        name: row.get("name")?,
        nickname: row.get("nickname")?,
        lifeboat: row.get("lifeboat")?,
        company: row.get("company")?,
        registration: row.get("registration")?,
        cabin: row.get("cabin")?,
        bunk: row.get("bunk")?,
        present,
        checkin_mode,
        checked_in_at: row.get("checked_in_at")?,
    })
}

fn count_column(row: &Row<'_>, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("count `{value}` in `{column}` out of range")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
