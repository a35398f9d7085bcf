///! Wires-X log snapshot reader

use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use tracing::warn;

use super::parser::parse_line;
use super::types::SightingRecord;

/// Read the whole Wires-X log and return its sightings newest-first.
///
/// Every line is parsed independently: a malformed line is logged and
/// skipped without touching its siblings. Only an unreadable file is an
/// error, and the caller skips that poll cycle and retries later.
pub fn read_snapshot(path: impl AsRef<Path>, tz: Tz) -> Result<Vec<SightingRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Wires-X log {}", path.display()))?;

    let mut records = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line, tz) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping log line {:?}: {}", line, e),
        }
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn line_at(callsign: &str, datetime: &str) -> String {
        format!(
            "{}%serial%desc%{}%Node%V-D%N:39 17' 59\" / E:009 12' 28\"%a%b%c%d%e",
            callsign, datetime
        )
    }

    #[test]
    fn test_snapshot_sorted_newest_first() {
        let l1 = line_at("AA1AA", "2026/08/30 10:00:00");
        let l2 = line_at("BB2BB", "2026/08/30 12:00:00");
        let l3 = line_at("CC3CC", "2026/08/30 11:00:00");
        let file = write_log(&[&l1, &l2, &l3]);

        let records = read_snapshot(file.path(), Tz::UTC).unwrap();
        let callsigns: Vec<&str> = records.iter().map(|r| r.callsign.as_str()).collect();
        assert_eq!(callsigns, ["BB2BB", "CC3CC", "AA1AA"]);
    }

    #[test]
    fn test_malformed_line_skipped_siblings_kept() {
        let good = line_at("AA1AA", "2026/08/30 10:00:00");
        let file = write_log(&[&good, "only%three%fields", &good]);

        let records = read_snapshot(file.path(), Tz::UTC).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.callsign == "AA1AA"));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let good = line_at("AA1AA", "2026/08/30 10:00:00");
        let file = write_log(&[&good, "", "   "]);

        let records = read_snapshot(file.path(), Tz::UTC).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = read_snapshot("/nonexistent/WiresAccess.log", Tz::UTC);
        assert!(result.is_err());
    }
}
