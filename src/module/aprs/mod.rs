///! APRS-IS module
///!
///! Builds outgoing position reports and owns the TCP session to the
///! APRS-IS server.

pub mod packet;
pub mod session;

pub use session::{AprsSession, SessionError, SessionState};
