///! Wires-X log line parser
///!
///! One log line is 12 `%`-delimited fields:
///!   callsign % serial % description % datetime % source % data %
///!   position % extra1 % extra2 % extra3 % extra4 % extra5

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use thiserror::Error;

use super::position::parse_position;
use super::types::SightingRecord;

const FIELD_COUNT: usize = 12;
const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One log line could not be parsed. The caller skips the line; it is
/// never fatal for the whole snapshot.
#[derive(Debug, Error)]
#[error("malformed record: {0}")]
pub struct MalformedRecord(String);

/// Parse one log line into a [`SightingRecord`].
///
/// The datetime field carries no zone of its own; its wall-clock
/// numbers are attached to the configured zone as-is.
pub fn parse_line(line: &str, tz: Tz) -> Result<SightingRecord, MalformedRecord> {
    let fields: Vec<&str> = line.trim().split('%').map(str::trim).collect();

    if fields.len() != FIELD_COUNT {
        return Err(MalformedRecord(format!(
            "expected {} '%'-delimited fields, got {}",
            FIELD_COUNT,
            fields.len()
        )));
    }

    let naive = NaiveDateTime::parse_from_str(fields[3], DATETIME_FORMAT)
        .map_err(|e| MalformedRecord(format!("bad datetime {:?}: {}", fields[3], e)))?;
    let timestamp = naive
        .and_local_timezone(tz)
        .earliest()
        .ok_or_else(|| MalformedRecord(format!("datetime {:?} does not exist in {}", fields[3], tz)))?;

    Ok(SightingRecord {
        callsign: fields[0].to_uppercase(),
        serial: fields[1].to_string(),
        description: fields[2].to_string(),
        timestamp,
        source: fields[4].to_string(),
        data: fields[5].to_string(),
        position: parse_position(fields[6]),
        extra: [
            fields[7].to_string(),
            fields[8].to_string(),
            fields[9].to_string(),
            fields[10].to_string(),
            fields[11].to_string(),
        ],
    })
}
