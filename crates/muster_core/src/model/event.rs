use serde::{Deserialize, Serialize};

/// Sequential event identifier, starting at 1.
pub type EventId = i64;

/// Event listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Current roster size.
    pub headcount: u32,
}
