//! Nodes of the replicated ticket space.
//!
//! Each [`Node`] owns a [`TicketSpace`](space::TicketSpace) and a registry of
//! peers. Purchases and cancellations are applied locally first, then fanned
//! out to every registered peer without waiting for acknowledgment, then
//! announced on the [`EventChannel`](events::EventChannel).
//!
//! Delivery is at-most-once: a peer that cannot be reached when the
//! operation fans out never sees it, and nothing detects the divergence.

pub mod cluster;
pub mod config;
pub mod error;
pub mod ids;
pub mod node;
pub mod pricing;
pub mod registry;
pub mod replication;
pub mod telemetry;

pub use cluster::Cluster;
pub use config::{ClusterConfig, LogFormat};
pub use error::{NodeError, Result};
pub use ids::{RandomTicketIds, TicketIds};
pub use node::{Node, NodeBuilder};
pub use pricing::{FlatPrice, PriceList};
pub use registry::{PeerHandle, PeerRegistry};
pub use replication::{Delivery, FireAndForget, Replicate, ReplicationSink};
