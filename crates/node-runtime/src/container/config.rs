//! # Node Configuration
//!
//! Unified configuration for the committee node.
//!
//! Every value has a default; `load_config` overrides them from `CN_*`
//! environment variables. Unparsable values are ignored with a warning.

use crate::wiring::ledger_feed::LEDGER_TOPICS;
use cn_02_dispatcher::DispatchConfig;
use shared_types::Address;
use thiserror::Error;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Logging configuration.
    pub log: LogConfig,
    /// Publisher feed configuration.
    pub feed: FeedConfig,
    /// Dispatch service configuration.
    pub dispatch: DispatchConfig,
    /// Committees run by this node.
    pub committees: CommitteeConfig,
}

impl NodeConfig {
    /// Check the configuration before startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dispatch
            .validate()
            .map_err(|e| ConfigError::Dispatch(e.to_string()))?;
        if !self.feed.hosts.is_empty() && self.feed.topics.is_empty() {
            return Err(ConfigError::NoTopics);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Dispatch settings rejected.
    #[error("Invalid dispatch config: {0}")]
    Dispatch(String),

    /// Feed hosts configured without any topic, nothing would be received.
    #[error("Feed hosts configured without topics (set CN_FEED_TOPICS)")]
    NoTopics,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Publisher feed configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Publisher addresses (`host:port`). Empty disables the feed monitor.
    pub hosts: Vec<String>,
    /// Topic prefixes to subscribe to.
    pub topics: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            topics: ["state", "request_in", "request_out"]
                .into_iter()
                .chain(LEDGER_TOPICS)
                .map(String::from)
                .collect(),
        }
    }
}

/// Committees run by this node.
#[derive(Debug, Clone, Default)]
pub struct CommitteeConfig {
    /// Committee addresses.
    pub addresses: Vec<Address>,
}

/// Load configuration from the process environment.
pub fn load_config() -> NodeConfig {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from `lookup`, falling back to defaults.
pub fn load_config_from<F>(lookup: F) -> NodeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::default();

    if let Some(filter) = lookup("CN_LOG") {
        config.log.filter = filter;
    }

    if let Some(hosts) = lookup("CN_FEED_HOSTS") {
        config.feed.hosts = split_list(&hosts);
    }
    if let Some(topics) = lookup("CN_FEED_TOPICS") {
        config.feed.topics = split_list(&topics);
    }

    if let Some(value) = lookup("CN_DISPATCH_EVENT_BUFFER") {
        match value.parse() {
            Ok(n) => config.dispatch.event_buffer = n,
            Err(_) => warn!(value = %value, "CN_DISPATCH_EVENT_BUFFER must be a number"),
        }
    }
    if let Some(value) = lookup("CN_DISPATCH_MAX_CONCURRENT") {
        match value.parse() {
            Ok(n) => config.dispatch.max_concurrent_events = n,
            Err(_) => warn!(value = %value, "CN_DISPATCH_MAX_CONCURRENT must be a number"),
        }
    }

    if let Some(list) = lookup("CN_COMMITTEES") {
        for item in split_list(&list) {
            match Address::from_hex(&item) {
                Ok(address) => config.committees.addresses.push(address),
                Err(e) => warn!(value = %item, error = %e, "Ignoring invalid committee address"),
            }
        }
    }

    config
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.log.filter, "info");
        assert!(config.feed.hosts.is_empty());
        for topic in LEDGER_TOPICS {
            assert!(config.feed.topics.iter().any(|t| t == topic));
        }
        assert_eq!(config.dispatch, DispatchConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let committee = "ab".repeat(32);
        let config = load_config_from(env(&[
            ("CN_LOG", "debug,cn_02_dispatcher=trace"),
            ("CN_FEED_HOSTS", "127.0.0.1:5550, 127.0.0.1:5551"),
            ("CN_FEED_TOPICS", "state"),
            ("CN_DISPATCH_EVENT_BUFFER", "64"),
            ("CN_COMMITTEES", committee.as_str()),
        ]));

        assert_eq!(config.log.filter, "debug,cn_02_dispatcher=trace");
        assert_eq!(config.feed.hosts, vec!["127.0.0.1:5550", "127.0.0.1:5551"]);
        assert_eq!(config.feed.topics, vec!["state"]);
        assert_eq!(config.dispatch.event_buffer, 64);
        assert_eq!(config.committees.addresses, vec![Address::new([0xAB; 32])]);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = load_config_from(env(&[
            ("CN_DISPATCH_MAX_CONCURRENT", "many"),
            ("CN_COMMITTEES", "nothex,"),
        ]));

        assert_eq!(
            config.dispatch.max_concurrent_events,
            DispatchConfig::default().max_concurrent_events
        );
        assert!(config.committees.addresses.is_empty());
    }

    #[test]
    fn test_validate_rejects_hosts_without_topics() {
        let mut config = NodeConfig::default();
        config.feed.hosts = vec!["127.0.0.1:5550".to_string()];
        config.feed.topics.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoTopics));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = NodeConfig::default();
        config.dispatch.max_concurrent_events = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Dispatch(_))));
    }
}
