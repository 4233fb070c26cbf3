//! Retention-based cleanup of stored backups
//!
//! Cleanup is best-effort by design: the new backup has already been
//! uploaded by the time this runs, so a failed delete costs storage, not
//! data. Per-object delete failures are accumulated as warnings and the
//! overall operation still reports success. A listing failure, by
//! contrast, aborts cleanup with a hard error.

use jiff::{SignedDuration, Timestamp};

use crate::error::Result;
use crate::store::ObjectStore;

/// Outcome of one cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Number of objects removed
    pub deleted: usize,
    /// Per-object delete failures, one message each
    pub warnings: Vec<String>,
}

/// Delete objects under `prefix` whose last-modified time precedes
/// `now − retention_days`
///
/// `retention_days <= 0` disables cleanup entirely: no store call is made.
/// The prefix is normalized to end with a separator so `truenas-backups`
/// does not also match `truenas-backups-other`.
pub async fn prune_expired(
    store: &dyn ObjectStore,
    prefix: &str,
    retention_days: i64,
    now: Timestamp,
) -> Result<CleanupReport> {
    if retention_days <= 0 {
        return Ok(CleanupReport::default());
    }

    let prefix = normalize_prefix(prefix);
    // 100 years is as good as unbounded and keeps the arithmetic in range
    let cutoff = now - SignedDuration::from_hours(retention_days.min(36_500) * 24);

    let mut report = CleanupReport::default();
    for object in store.list_objects(&prefix).await? {
        let Some(modified) = object.last_modified else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }
        match store.delete_object(&object.key).await {
            Ok(()) => {
                tracing::info!(key = %object.key, "deleted old backup");
                report.deleted += 1;
            }
            Err(e) => {
                tracing::warn!(key = %object.key, error = %e, "failed to delete old backup");
                report.warnings.push(format!("{}: {}", object.key, e));
            }
        }
    }

    Ok(report)
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}
