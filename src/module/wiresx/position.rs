///! DMS position codec
///!
///! Decodes the Wires-X position field, e.g.
///!   N:39 17' 59" / E:009 12' 28"
///! into signed decimal degrees plus the APRS compact coordinate string.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Position;

/// One DMS component: sign letter, colon, degrees, minutes', seconds".
/// Whitespace around tokens is insignificant.
static DMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([NSEWnsew])\s*:\s*(\d+)\s+(\d+)\s*'\s*(\d+)\s*"$"#).unwrap()
});

/// Decode a raw position field into a [`Position`].
///
/// Returns `None` for anything that is not a full DMS pair. That is a
/// lenient fallback, not an error: the node writes an empty or dashed
/// field for stations without a fix, and those records must still parse.
pub fn parse_position(raw: &str) -> Option<Position> {
    if !(raw.contains('\'') && raw.contains('"') && raw.contains('/')) {
        return None;
    }

    let (raw_latitude, raw_longitude) = raw.split_once('/')?;
    let (latitude, latitude_aprs) = parse_component(raw_latitude.trim())?;
    let (longitude, longitude_aprs) = parse_component(raw_longitude.trim())?;

    Some(Position {
        latitude,
        longitude,
        latitude_aprs,
        longitude_aprs,
    })
}

/// Decode one side of the pair, returning the decimal value and the
/// compact APRS string.
fn parse_component(raw: &str) -> Option<(f64, String)> {
    let caps = DMS_RE.captures(raw)?;

    let sign = caps[1].to_uppercase();
    let raw_degrees = &caps[2];
    let degrees: u32 = raw_degrees.parse().ok()?;
    let minutes: u32 = caps[3].parse().ok()?;
    let seconds: u32 = caps[4].parse().ok()?;

    let mut value = f64::from(degrees) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0;
    if sign == "S" || sign == "W" {
        value = -value;
    }

    // The compact form transcribes the log's digits as-is: the degree
    // token keeps its width (longitudes are logged with three digits)
    // and the seconds land where APRS expects hundredths of a minute.
    // Receivers of this feed expect exactly this shape; do not "fix" it
    // into a real decimal-minutes conversion.
    let aprs = format!("{:0>2}{:02}.{:02}{}", raw_degrees, minutes, seconds, sign);

    Some((value, aprs))
}
