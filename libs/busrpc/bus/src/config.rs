use std::collections::BTreeMap;

/// Raised when a recognized config key carries a value that does not
/// parse as an integer or falls outside its documented range.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config key {key} has a non-integer value {value:?}")]
    NotAnInteger { key: &'static str, value: String },
    #[error("config key {key} value {value} is outside its valid range")]
    OutOfRange { key: &'static str, value: i64 },
}

/// Splits a `key=value` text blob into a map, one entry per non-blank,
/// non-comment (`#`) line. Reading that text from a file or environment is
/// the host's concern; this only does the parsing spec.md's config format
/// requires.
#[must_use]
pub fn parse_kv(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect()
}

fn parse_bounded(map: &BTreeMap<String, String>, key: &'static str, default: u32, min: i64, max: i64) -> Result<u32, ConfigError> {
    let Some(raw) = map.get(key) else {
        return Ok(default);
    };
    let value: i64 = raw.parse().map_err(|_| ConfigError::NotAnInteger { key, value: raw.clone() })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { key, value });
    }
    Ok(u32::try_from(value).expect("range already checked against non-negative bounds"))
}

/// Client-side configuration. Defaults match spec.md's literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum number of in-flight (sent, awaiting reply) requests before
    /// `send` fails with `ClientBusy`.
    pub rpcc_pending_calls: u32,
    /// Default per-call timeout in seconds, used when a send supplies
    /// `timeout_s == 0`.
    pub rpcc_rpc_timeout: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { rpcc_pending_calls: 10_000, rpcc_rpc_timeout: 10 }
    }
}

impl ClientConfig {
    pub fn from_kv(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            rpcc_pending_calls: parse_bounded(map, "rpcc_pending_calls", defaults.rpcc_pending_calls, 1, i64::from(u32::MAX))?,
            rpcc_rpc_timeout: parse_bounded(map, "rpcc_rpc_timeout", defaults.rpcc_rpc_timeout, 1, 3600)?,
        })
    }
}

/// Server-side configuration. Defaults match spec.md's literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Cap on pending work summed across every per-client queue before new
    /// non-`no_reply` requests are answered with `SERVER_BUSY`.
    pub rpcs_pending_calls: u32,
    /// Width of the fixed worker pool that multiplexes across every
    /// logged-in client's queue, independent of how many clients there are.
    pub rpcs_worker_count: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { rpcs_pending_calls: 10_000, rpcs_worker_count: 2 }
    }
}

impl ServerConfig {
    pub fn from_kv(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            rpcs_pending_calls: parse_bounded(map, "rpcs_pending_calls", defaults.rpcs_pending_calls, 1, i64::from(u32::MAX))?,
            rpcs_worker_count: parse_bounded(map, "rpcs_worker_count", defaults.rpcs_worker_count, 1, 100)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_kv, ClientConfig, ServerConfig};

    #[test]
    fn defaults_match_the_documented_values() {
        assert_eq!(ClientConfig::default().rpcc_pending_calls, 10_000);
        assert_eq!(ClientConfig::default().rpcc_rpc_timeout, 10);
        assert_eq!(ServerConfig::default().rpcs_pending_calls, 10_000);
        assert_eq!(ServerConfig::default().rpcs_worker_count, 2);
    }

    #[test]
    fn parses_and_applies_overrides() {
        let map = parse_kv("# comment\nrpcc_pending_calls=5\nrpcc_rpc_timeout=30\n\n");
        let config = ClientConfig::from_kv(&map).unwrap();
        assert_eq!(config.rpcc_pending_calls, 5);
        assert_eq!(config.rpcc_rpc_timeout, 30);
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let map = parse_kv("rpcc_rpc_timeout=5000");
        assert!(ClientConfig::from_kv(&map).is_err());
    }

    #[test]
    fn rejects_worker_count_above_cap() {
        let map = parse_kv("rpcs_worker_count=101");
        assert!(ServerConfig::from_kv(&map).is_err());
    }
}
