//! Full-mesh assembly of nodes from configuration.

use std::collections::HashSet;
use std::sync::Arc;

use common::NodeId;
use events::EventChannel;

use crate::config::ClusterConfig;
use crate::error::{NodeError, Result};
use crate::node::Node;
use crate::pricing::{FlatPrice, PriceList};

/// A set of nodes where every node is a peer of every other node.
#[derive(Debug)]
pub struct Cluster {
    nodes: Vec<Node>,
}

impl Cluster {
    /// Builds one node per configured ID and connects them in a full mesh.
    ///
    /// All nodes publish on `events`. Must be called from within a Tokio
    /// runtime.
    #[tracing::instrument(skip(config, events), fields(nodes = config.node_ids.len()))]
    pub async fn from_config(config: &ClusterConfig, events: EventChannel) -> Result<Self> {
        if config.node_ids.is_empty() {
            return Err(NodeError::InvalidConfig("no node IDs configured".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = config.node_ids.iter().find(|id| !seen.insert(*id)) {
            return Err(NodeError::InvalidConfig(format!(
                "duplicate node ID: {duplicate}"
            )));
        }

        let prices: Arc<dyn PriceList> = Arc::new(FlatPrice(config.ticket_price));
        let nodes: Vec<Node> = config
            .node_ids
            .iter()
            .map(|id| {
                Node::builder(id.clone(), events.clone())
                    .inbox_capacity(config.inbox_capacity)
                    .price_list(Arc::clone(&prices))
                    .build()
            })
            .collect();

        for node in &nodes {
            for peer in nodes.iter().filter(|peer| peer.id() != node.id()) {
                node.add_peer(peer.handle()).await;
            }
        }

        tracing::info!("cluster assembled");
        Ok(Self { nodes })
    }

    /// Returns the node with `id`, if it is part of the cluster.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Returns every node in configuration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Stops inbound replication on every node.
    pub fn shutdown(&self) {
        for node in &self.nodes {
            node.shutdown();
        }
    }
}
