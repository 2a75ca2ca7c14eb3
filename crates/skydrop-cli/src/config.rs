//! Run configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub move_budget: u32,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("resultfiles"),
            move_budget: skydrop_core::PlannerConfig::default().move_budget,
            http_timeout: skydrop_client::rest::DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            output_dir: lookup("SKYDROP_OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            move_budget: lookup("SKYDROP_MOVE_BUDGET")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.move_budget),
            http_timeout: lookup("SKYDROP_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.move_budget, 2000);
    }

    #[test]
    fn reads_overrides() {
        let vars = HashMap::from([
            ("SKYDROP_OUTPUT_DIR", "/tmp/out"),
            ("SKYDROP_MOVE_BUDGET", "150"),
            ("SKYDROP_HTTP_TIMEOUT_SECS", "3"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.move_budget, 150);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn garbage_falls_back() {
        let config = Config::from_lookup(|key| {
            (key == "SKYDROP_MOVE_BUDGET").then(|| "lots".to_string())
        });
        assert_eq!(config.move_budget, 2000);
    }
}
