//! Flat CSV snapshot of application rows.

use std::fmt::Write as _;
use std::path::Path;

use crate::models::application::ApplicationRow;

pub const CSV_HEADER: &str = "timestamp,title,company,location,url,resume_path,status";

/// Renders rows in the order given, one line each, under `CSV_HEADER`.
pub fn render_csv(rows: &[ApplicationRow]) -> String {
    let mut output = String::with_capacity(64 * (rows.len() + 1));
    output.push_str(CSV_HEADER);
    output.push('\n');

    for row in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{}",
            row.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_csv(&row.title),
            escape_csv(&row.company),
            escape_csv(&row.location),
            escape_csv(&row.url),
            escape_csv(&row.resume_path),
            escape_csv(&row.status),
        );
    }

    output
}

/// Writes `contents` next to `destination` and renames it into place, so a
/// reader never sees a half-written snapshot.
pub async fn write_snapshot(destination: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let staging = destination.with_extension("csv.partial");
    tokio::fs::write(&staging, contents).await?;
    tokio::fs::rename(&staging, destination).await
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
