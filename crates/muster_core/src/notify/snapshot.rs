//! JSON summary snapshots on disk.
//!
//! Each event keeps one `event_{id}_summary.json` file holding its latest
//! summary. Files are replaced through a temporary sibling and a rename.

use super::SummaryNotifier;
use crate::model::event::EventId;
use crate::model::summary::Summary;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Writes the latest summary of each event into a directory.
#[derive(Debug, Clone)]
pub struct SnapshotNotifier {
    dir: PathBuf,
}

impl SnapshotNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for `event_id`.
    pub fn snapshot_path(&self, event_id: EventId) -> PathBuf {
        self.dir.join(format!("event_{event_id}_summary.json"))
    }

    /// Writes one snapshot.
    ///
    /// # Errors
    /// - Returns I/O errors from directory creation, write or rename.
    pub fn write_snapshot(&self, summary: &Summary) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.snapshot_path(summary.event_id);
        let tmp_path = path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(summary).map_err(io::Error::other)?;
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }
}

impl SummaryNotifier for SnapshotNotifier {
    fn summary_changed(&self, summary: &Summary) {
        match self.write_snapshot(summary) {
            Ok(path) => info!(
                "event=summary_snapshot module=notify status=ok event_id={} path={}",
                summary.event_id,
                path.display()
            ),
            Err(err) => warn!(
                "event=summary_snapshot module=notify status=error event_id={} dir={} error={}",
                summary.event_id,
                self.dir.display(),
                err
            ),
        }
    }
}
