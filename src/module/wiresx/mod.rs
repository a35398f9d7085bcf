///! Wires-X log ingestion module
///!
///! Reads the node's `%`-delimited sighting log and turns it into
///! structured records, including the DMS position decode and the
///! APRS compact-coordinate encode.

pub mod parser;
pub mod position;
pub mod reader;
pub mod types;

pub use parser::MalformedRecord;
pub use reader::read_snapshot;
pub use types::{Position, SightingRecord};
