///! One poll cycle: Wires-X log snapshot → APRS-IS
///!
///! The bridge owns the per-cycle pipeline. Scheduling lives in
///! [`crate::module::scheduled`]; the session is shared in.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::module::aprs::packet::{build_position_report, is_fresh};
use crate::module::aprs::session::AprsSession;
use crate::module::wiresx::read_snapshot;

pub struct Bridge {
    log_file_path: PathBuf,
    timezone: Tz,
    comment: String,
    staleness_margin: TimeDelta,
    session: Arc<AprsSession>,
}

impl Bridge {
    pub fn new(
        log_file_path: impl Into<PathBuf>,
        timezone: Tz,
        comment: impl Into<String>,
        staleness_margin: TimeDelta,
        session: Arc<AprsSession>,
    ) -> Self {
        Self {
            log_file_path: log_file_path.into(),
            timezone,
            comment: comment.into(),
            staleness_margin,
            session,
        }
    }

    /// Run one cycle: read the log, then forward every fresh positioned
    /// sighting, newest first. The snapshot is rebuilt from scratch here;
    /// nothing is carried over between cycles.
    pub async fn run_cycle(&self) -> Result<()> {
        debug!("Reading Wires-X log file");
        let records = read_snapshot(&self.log_file_path, self.timezone)?;
        debug!("Snapshot holds {} records", records.len());

        let now = Utc::now().with_timezone(&self.timezone);

        for record in &records {
            if record.position.is_none() {
                debug!("Skipping {}: no position fix", record.callsign);
                continue;
            }
            if !is_fresh(record, now, self.staleness_margin) {
                debug!(
                    "Skipping {}: sighting from {} is stale",
                    record.callsign, record.timestamp
                );
                continue;
            }

            let Some(packet) = build_position_report(record, &self.comment) else {
                continue;
            };
            info!("Forwarding to APRS-IS: {}", packet);
            self.session
                .send(&format!("{}\r\n", packet))
                .await
                .with_context(|| format!("Failed to forward sighting of {}", record.callsign))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn fresh_log_line(callsign: &str, position: &str, age: TimeDelta) -> String {
        let timestamp = (Utc::now() - age).format("%Y/%m/%d %H:%M:%S");
        format!(
            "{}%serial%desc%{}%Node%V-D%{}%a%b%c%d%e",
            callsign, timestamp, position
        )
    }

    #[tokio::test]
    async fn test_cycle_forwards_only_fresh_positioned_records() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let session = Arc::new(AprsSession::new());
        session
            .connect(&addr.ip().to_string(), addr.port())
            .await
            .unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        let dms = "N:39 17' 59\" / E:009 12' 28\"";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", fresh_log_line("N0CALL-9", dms, TimeDelta::zero())).unwrap();
        writeln!(file, "{}", fresh_log_line("OLD1AA", dms, TimeDelta::hours(2))).unwrap();
        writeln!(file, "{}", fresh_log_line("NOFIX", "--", TimeDelta::zero())).unwrap();

        let bridge = Bridge::new(
            file.path(),
            Tz::UTC,
            "test",
            TimeDelta::minutes(5),
            session.clone(),
        );
        bridge.run_cycle().await.unwrap();
        session.stop().await;

        let mut wire = String::new();
        server.read_to_string(&mut wire).await.unwrap();
        assert_eq!(wire, "N0CALL-MP>APRS,TCPIP*:!3917.59N/00912.28E} test\r\n");
    }

    #[tokio::test]
    async fn test_missing_log_file_fails_cycle() {
        let session = Arc::new(AprsSession::new());
        let bridge = Bridge::new(
            "/nonexistent/WiresAccess.log",
            Tz::UTC,
            "test",
            TimeDelta::minutes(5),
            session,
        );
        assert!(bridge.run_cycle().await.is_err());
    }
}
