//! Domain model for muster events, rosters and attendance summaries.
//!
//! # Invariants
//! - Events and persons are identified by sequential integer IDs.
//! - Persons are owned by exactly one event and are never deleted.
//! - Summaries are derived on demand and never stored.

pub mod event;
pub mod person;
pub mod summary;
