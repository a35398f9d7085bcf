use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// APRS-IS server and login settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AprsIsConfig {
    pub address: String,
    pub port: u16,
    pub callsign: String,
    pub password: String,
    /// Server-side packet filter, passed through verbatim on login
    pub filter: String,
    /// Free-text comment appended to every outgoing position report
    pub comment: String,
}

/// Wires-X node log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiresXConfig {
    pub log_file_path: String,
    /// IANA timezone name the node writes its log timestamps in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Poll-cycle timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Idle wait between poll cycles, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum sighting age before it is skipped, in seconds.
    /// Compensates for logging latency on the node side.
    #[serde(default = "default_staleness_margin_secs")]
    pub staleness_margin_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub aprs_is: AprsIsConfig,
    pub wiresx: WiresXConfig,

    #[serde(default)]
    pub bridge: TimingConfig,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_staleness_margin_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            staleness_margin_secs: default_staleness_margin_secs(),
        }
    }
}

impl BridgeConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: BridgeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    /// Resolve the configured timezone name.
    pub fn timezone(&self) -> Result<Tz> {
        self.wiresx
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", self.wiresx.timezone, e))
    }
}

pub static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

/// Load and validate the configuration once, at startup. Any missing or
/// invalid required setting is fatal here, before polling starts.
pub fn read_config(path: &str) -> Result<()> {
    let config = BridgeConfig::from_file(path)?;

    // Fail fast on a bad timezone name rather than on the first poll cycle
    config.timezone()?;

    CONFIG.set(config).ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
        log_level = "debug"

        [aprs_is]
        address = "rotate.aprs2.net"
        port = 14580
        callsign = "N0CALL"
        password = "-1"
        filter = "r/39.2/9.2/50"
        comment = "Wires-X node"

        [wiresx]
        log_file_path = "/var/log/wiresx/WiresAccess.log"
        timezone = "Europe/Rome"

        [bridge]
        poll_interval_secs = 10
        staleness_margin_secs = 120
    "#;

    #[test]
    fn test_parse_full_config() {
        let config: BridgeConfig = toml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.aprs_is.port, 14580);
        assert_eq!(config.aprs_is.comment, "Wires-X node");
        assert_eq!(config.bridge.poll_interval_secs, 10);
        assert_eq!(config.bridge.staleness_margin_secs, 120);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn test_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [aprs_is]
            address = "localhost"
            port = 14580
            callsign = "N0CALL"
            password = "-1"
            filter = ""
            comment = ""

            [wiresx]
            log_file_path = "wiresx.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.wiresx.timezone, "UTC");
        assert_eq!(config.bridge.poll_interval_secs, 5);
        assert_eq!(config.bridge.staleness_margin_secs, 300);
    }

    #[test]
    fn test_missing_required_section() {
        let result = toml::from_str::<BridgeConfig>("log_level = \"info\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_timezone_rejected() {
        let mut config: BridgeConfig = toml::from_str(FULL_CONFIG).unwrap();
        config.wiresx.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.timezone().is_err());
    }
}
