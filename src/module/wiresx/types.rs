///! Wires-X sighting data types

use chrono::DateTime;
use chrono_tz::Tz;

/// Geographic fix decoded from the Wires-X DMS position field.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Decimal degrees, negative for southern/western hemisphere
    pub latitude: f64,
    pub longitude: f64,
    /// APRS compact latitude, e.g. "3917.59N"
    pub latitude_aprs: String,
    /// APRS compact longitude, e.g. "00912.28E"
    pub longitude_aprs: String,
}

/// One station sighting parsed from a Wires-X log line.
#[derive(Debug, Clone)]
pub struct SightingRecord {
    /// Heard station's callsign, upper-cased
    pub callsign: String,
    /// Radio serial / ID, opaque
    pub serial: String,
    /// Free-text description
    pub description: String,
    /// Wall-clock time the node logged the sighting, in the configured zone
    pub timestamp: DateTime<Tz>,
    pub source: String,
    pub data: String,
    /// None when the position field was empty or malformed; such a
    /// record is never transmitted but stays inspectable.
    pub position: Option<Position>,
    /// Trailing passthrough fields, kept verbatim
    pub extra: [String; 5],
}
