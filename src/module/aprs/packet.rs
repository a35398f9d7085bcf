///! APRS-IS position report builder and staleness policy

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::module::wiresx::types::SightingRecord;

/// A sighting is worth forwarding while `timestamp + margin >= now`.
/// The margin absorbs logging and reporting latency on the node side.
pub fn is_fresh(record: &SightingRecord, now: DateTime<Tz>, margin: TimeDelta) -> bool {
    record.timestamp + margin >= now
}

/// Strip the SSID / suffix from a heard callsign: keep everything
/// before the first non-alphanumeric character, so "N0CALL-9" and
/// "N0CALL/ND" both report as "N0CALL".
fn base_callsign(callsign: &str) -> &str {
    let end = callsign
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(callsign.len());
    &callsign[..end]
}

/// Render one positioned sighting as an APRS-IS position report line
/// (without the trailing CRLF). Returns `None` for a record with no
/// position fix; there is nothing to report for those.
///
/// The "-MP" suffix and the "!...}" framing are fixed literals of the
/// mini position-report format the downstream receivers expect.
pub fn build_position_report(record: &SightingRecord, comment: &str) -> Option<String> {
    let position = record.position.as_ref()?;

    Some(format!(
        "{}-MP>APRS,TCPIP*:!{}/{}}} {}",
        base_callsign(&record.callsign),
        position.latitude_aprs,
        position.longitude_aprs,
        comment
    ))
}
