//! Backup filename and object key composition

use jiff::Timestamp;

/// Compose the backup filename for one run
///
/// Format: `{name}-config-{YYYYmmdd-HHMMSS}.tar`, timestamp in UTC with
/// second precision. Two runs for the same appliance within one second
/// produce the same name and the later upload overwrites the earlier one;
/// this matches the upstream behavior and is accepted as-is.
pub fn backup_filename(appliance_name: &str, run_start: Timestamp) -> String {
    format!(
        "{}-config-{}.tar",
        appliance_name,
        run_start.strftime("%Y%m%d-%H%M%S")
    )
}

/// Compose the full object key from a prefix and filename
///
/// An empty prefix yields the bare filename with no leading separator.
pub fn object_key(prefix: &str, filename: &str) -> String {
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{prefix}/{filename}")
    }
}
