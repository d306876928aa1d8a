//! Derived attendance summary.
//!
//! # Invariants
//! - `present + absent == total` per lifeboat and overall.
//! - `by_lifeboat` is ordered by label, byte-wise ascending.

use crate::model::event::EventId;
use serde::{Deserialize, Serialize};

/// Per-lifeboat headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeboatSummary {
    pub lifeboat: String,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
}

impl LifeboatSummary {
    /// Builds a group from total and present counts.
    ///
    /// `present` is clamped to `total`.
    pub fn new(lifeboat: impl Into<String>, total: u32, present: u32) -> Self {
        let present = present.min(total);
        Self {
            lifeboat: lifeboat.into(),
            total,
            present,
            absent: total - present,
        }
    }
}

/// Aggregate present/absent view of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub event_id: EventId,
    /// POB.
    pub total_headcount: u32,
    pub present: u32,
    pub absent: u32,
    pub by_lifeboat: Vec<LifeboatSummary>,
}

impl Summary {
    /// Folds lifeboat groups into an event summary, sorting groups by label.
    pub fn from_groups(event_id: EventId, mut groups: Vec<LifeboatSummary>) -> Self {
        groups.sort_by(|left, right| left.lifeboat.as_bytes().cmp(right.lifeboat.as_bytes()));
        let total_headcount = groups.iter().map(|group| group.total).sum();
        let present = groups.iter().map(|group| group.present).sum();
        Self {
            event_id,
            total_headcount,
            present,
            absent: total_headcount - present,
            by_lifeboat: groups,
        }
    }

    /// Summary of an event with an empty roster.
    pub fn empty(event_id: EventId) -> Self {
        Self::from_groups(event_id, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::{LifeboatSummary, Summary};

    #[test]
    fn from_groups_sorts_by_label_and_totals_counts() {
        let summary = Summary::from_groups(
            7,
            vec![
                LifeboatSummary::new("B2", 3, 1),
                LifeboatSummary::new("B10", 2, 2),
                LifeboatSummary::new("A1", 1, 0),
            ],
        );

        let labels: Vec<&str> = summary
            .by_lifeboat
            .iter()
            .map(|group| group.lifeboat.as_str())
            .collect();
        assert_eq!(labels, vec!["A1", "B10", "B2"]);
        assert_eq!(summary.total_headcount, 6);
        assert_eq!(summary.present, 3);
        assert_eq!(summary.absent, 3);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let summary = Summary::from_groups(1, vec![LifeboatSummary::new("B3", 2, 1)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["eventId"], 1);
        assert_eq!(json["totalHeadcount"], 2);
        assert_eq!(json["byLifeboat"][0]["lifeboat"], "B3");
        assert_eq!(json["byLifeboat"][0]["absent"], 1);
    }
}
