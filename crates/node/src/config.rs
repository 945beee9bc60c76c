//! Cluster configuration loaded from environment variables.

use common::{Money, NodeId};

use crate::node::DEFAULT_INBOX_CAPACITY;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Cluster configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CLUSTER_NODES`: comma-separated node IDs (default: `"Node1,Node2,Node3"`)
/// - `REPLICATION_INBOX_CAPACITY`: per-node inbox bound (default: `1024`)
/// - `TICKET_PRICE_CENTS`: flat ticket price in cents, above zero (default: `5000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `"json"` or `"pretty"` (default: `"pretty"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub node_ids: Vec<NodeId>,
    pub inbox_capacity: usize,
    pub ticket_price: Money,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl ClusterConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let node_ids = lookup("CLUSTER_NODES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(NodeId::from)
                    .collect::<Vec<_>>()
            })
            .filter(|ids| !ids.is_empty())
            .unwrap_or(defaults.node_ids);

        Self {
            node_ids,
            inbox_capacity: lookup("REPLICATION_INBOX_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|&capacity: &usize| capacity > 0)
                .unwrap_or(defaults.inbox_capacity),
            ticket_price: lookup("TICKET_PRICE_CENTS")
                .and_then(|v| v.parse().ok())
                .map(Money::from_cents)
                .filter(Money::is_positive)
                .unwrap_or(defaults.ticket_price),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_ids: vec!["Node1".into(), "Node2".into(), "Node3".into()],
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            ticket_price: Money::from_dollars(50),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
