//! Summary-changed notification seam.
//!
//! # Responsibility
//! - Hand freshly computed summaries to push collaborators after check-ins.
//! - Provide file snapshot and fan-out implementations.
//!
//! # Invariants
//! - Notifiers are called outside the repository lock.
//! - Notification failures never fail the triggering check-in.

mod snapshot;

pub use snapshot::SnapshotNotifier;

use crate::model::summary::Summary;
use std::sync::Arc;

/// Receiver of summary-changed notifications.
pub trait SummaryNotifier: Send + Sync {
    fn summary_changed(&self, summary: &Summary);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl SummaryNotifier for NoopNotifier {
    fn summary_changed(&self, _summary: &Summary) {}
}

/// Forwards each notification to every target, in registration order.
#[derive(Default)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn SummaryNotifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, target: Arc<dyn SummaryNotifier>) -> Self {
        self.targets.push(target);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl SummaryNotifier for FanoutNotifier {
    fn summary_changed(&self, summary: &Summary) {
        for target in &self.targets {
            target.summary_changed(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FanoutNotifier, SummaryNotifier};
    use crate::model::summary::Summary;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<i64>>,
    }

    impl SummaryNotifier for Recorder {
        fn summary_changed(&self, summary: &Summary) {
            self.seen.lock().unwrap().push(summary.event_id);
        }
    }

    #[test]
    fn fanout_forwards_to_every_target() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let fanout = FanoutNotifier::new()
            .with(first.clone())
            .with(second.clone());

        fanout.summary_changed(&Summary::empty(3));

        assert_eq!(fanout.len(), 2);
        assert_eq!(*first.seen.lock().unwrap(), vec![3]);
        assert_eq!(*second.seen.lock().unwrap(), vec![3]);
    }
}
