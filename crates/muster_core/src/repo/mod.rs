//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for events and rosters.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Roster writes go through `RosterRow::normalize()` before persistence.
//! - Repository APIs return semantic errors (`EventNotFound`,
//!   `PersonNotFound`) in addition to DB transport errors.

pub mod attendance_repo;
