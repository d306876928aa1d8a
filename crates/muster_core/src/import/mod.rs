//! Roster importers.
//!
//! Importers turn external roster sources into `RosterRow` values. They do
//! not validate rows; the repository drops invalid ones on import.

pub mod roster_csv;
