//! Crew member (tripulante) model and roster row validation.
//!
//! # Responsibility
//! - Define the roster record owned by one event.
//! - Normalize imported rows before they reach storage.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `lifeboat` is stored trimmed and upper-cased.
//! - `name` and `lifeboat` are never blank for a stored person.

use crate::model::event::EventId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sequential person identifier, unique within the process.
pub type PersonId = i64;

/// How a check-in was captured on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinMode {
    /// Registration typed in by the operator.
    #[default]
    Manual,
    /// QR code or biometric read.
    Auto,
}

impl CheckinMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// Roster record for one crew member in one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub event_id: EventId,
    pub name: String,
    /// Nome de guerra. Empty when not supplied.
    pub nickname: String,
    pub lifeboat: String,
    pub company: String,
    /// Matrícula. Empty when not supplied.
    pub registration: String,
    pub cabin: String,
    pub bunk: String,
    pub present: bool,
    /// Mode of the last check-in, `None` before the first one.
    pub checkin_mode: Option<CheckinMode>,
    /// Unix epoch milliseconds of the last check-in.
    pub checked_in_at: Option<i64>,
}

impl Person {
    /// Returns whether `identifier` names this person by full name or nickname.
    ///
    /// An empty nickname never matches.
    pub fn answers_to(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return false;
        }
        eq_ignore_case(&self.name, identifier)
            || (!self.nickname.is_empty() && eq_ignore_case(&self.nickname, identifier))
    }
}

/// Raw roster row as handed over by an importer (CSV or JSON).
///
/// Every field is optional so malformed rows can be skipped instead of
/// failing the whole import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "nome_guerra", alias = "nomeGuerra")]
    pub nickname: Option<String>,
    #[serde(default, alias = "baleeira")]
    pub lifeboat: Option<String>,
    #[serde(default, alias = "empresa")]
    pub company: Option<String>,
    #[serde(default, alias = "matricula")]
    pub registration: Option<String>,
    #[serde(default, alias = "camarote")]
    pub cabin: Option<String>,
    #[serde(default, alias = "leito")]
    pub bunk: Option<String>,
}

impl RosterRow {
    /// Creates a row with the two required fields set.
    pub fn new(name: impl Into<String>, lifeboat: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            lifeboat: Some(lifeboat.into()),
            ..Self::default()
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_registration(mut self, registration: impl Into<String>) -> Self {
        self.registration = Some(registration.into());
        self
    }

    /// Validates and normalizes this row into an insertable person.
    ///
    /// # Errors
    /// - `BlankName` when the name is missing or whitespace only.
    /// - `BlankLifeboat` when the lifeboat is missing or whitespace only.
    pub fn normalize(&self) -> Result<NewPerson, RowValidationError> {
        let name = trimmed(&self.name);
        if name.is_empty() {
            return Err(RowValidationError::BlankName);
        }
        let lifeboat = self
            .lifeboat
            .as_deref()
            .map(normalize_lifeboat)
            .unwrap_or_default();
        if lifeboat.is_empty() {
            return Err(RowValidationError::BlankLifeboat);
        }

        Ok(NewPerson {
            name,
            nickname: trimmed(&self.nickname),
            lifeboat,
            company: trimmed(&self.company),
            registration: trimmed(&self.registration),
            cabin: trimmed(&self.cabin),
            bunk: trimmed(&self.bunk),
        })
    }
}

/// Normalized roster row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub nickname: String,
    pub lifeboat: String,
    pub company: String,
    pub registration: String,
    pub cabin: String,
    pub bunk: String,
}

/// Reason a roster row was dropped during import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowValidationError {
    BlankName,
    BlankLifeboat,
}

impl Display for RowValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "invalid row: name is blank"),
            Self::BlankLifeboat => write!(f, "invalid row: lifeboat is blank"),
        }
    }
}

impl Error for RowValidationError {}

/// Check-in command for one crew member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    /// Full name or nickname.
    pub name_or_nick: String,
    #[serde(alias = "baleeira")]
    pub lifeboat: String,
    pub present: bool,
    #[serde(default)]
    pub mode: CheckinMode,
}

impl CheckinRequest {
    pub fn new(name_or_nick: impl Into<String>, lifeboat: impl Into<String>, present: bool) -> Self {
        Self {
            name_or_nick: name_or_nick.into(),
            lifeboat: lifeboat.into(),
            present,
            mode: CheckinMode::Manual,
        }
    }
}

/// Trims and upper-cases a lifeboat label.
pub fn normalize_lifeboat(value: &str) -> String {
    value.trim().to_uppercase()
}

pub(crate) fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}
