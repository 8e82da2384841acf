// SPDX-License-Identifier: MPL-2.0

//! Snapshot file naming and retention

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SNAPSHOT_PREFIX: &str = "snap_";
const SNAPSHOT_EXTENSION: &str = "jpg";

/// File name for a snapshot stamped with `timestamp` (epoch seconds)
pub fn snapshot_file_name(timestamp: i64) -> String {
    format!("{SNAPSHOT_PREFIX}{timestamp}.{SNAPSHOT_EXTENSION}")
}

/// Path of a snapshot inside `output_dir`
pub fn snapshot_path(output_dir: &Path, timestamp: i64) -> PathBuf {
    output_dir.join(snapshot_file_name(timestamp))
}

/// Timestamp embedded in a `snap_<digits>.jpg` file name
pub fn parse_snapshot_timestamp(file_name: &str) -> Option<i64> {
    let digits = file_name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_EXTENSION)?
        .strip_suffix('.')?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Delete snapshots whose timestamp is older than `now - max_age_secs`
///
/// Files not named like snapshots are never touched. Returns the removed paths.
pub fn prune_snapshots(output_dir: &Path, now: i64, max_age_secs: u64) -> Vec<PathBuf> {
    let cutoff = now.saturating_sub(max_age_secs.min(i64::MAX as u64) as i64);
    let mut removed = Vec::new();

    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %output_dir.display(), error = %e, "Cannot scan output directory");
            return removed;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(timestamp) = name.to_str().and_then(parse_snapshot_timestamp) else {
            continue;
        };
        if timestamp >= cutoff {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed expired snapshot");
                removed.push(path);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove snapshot"),
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(snapshot_file_name(1_700_000_000), "snap_1700000000.jpg");
        assert_eq!(
            snapshot_path(Path::new("/tmp/pics"), 5),
            PathBuf::from("/tmp/pics/snap_5.jpg")
        );
    }

    #[test]
    fn test_parse_snapshot_timestamp() {
        assert_eq!(parse_snapshot_timestamp("snap_1700000000.jpg"), Some(1_700_000_000));
        assert_eq!(parse_snapshot_timestamp("snap_7.jpg"), Some(7));
        assert_eq!(parse_snapshot_timestamp("snap_.jpg"), None);
        assert_eq!(parse_snapshot_timestamp("snap_12a.jpg"), None);
        assert_eq!(parse_snapshot_timestamp("snap_12.png"), None);
        assert_eq!(parse_snapshot_timestamp("photo_12.jpg"), None);
        assert_eq!(parse_snapshot_timestamp("snap_12jpg"), None);
    }

    #[test]
    fn test_prune_removes_only_expired_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["snap_100.jpg", "snap_950.jpg", "snap_1000.jpg", "notes.txt", "snap_5.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let mut removed = prune_snapshots(dir.path(), 1000, 100);
        removed.sort();

        assert_eq!(removed, vec![dir.path().join("snap_100.jpg")]);
        assert!(dir.path().join("snap_950.jpg").exists());
        assert!(dir.path().join("snap_1000.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("snap_5.png").exists());
    }

    #[test]
    fn test_prune_missing_directory_is_harmless() {
        assert!(prune_snapshots(Path::new("/nonexistent/snapcam"), 10, 1).is_empty());
    }
}
