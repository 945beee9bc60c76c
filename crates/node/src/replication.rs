//! Propagation of local changes to peer nodes.

use async_trait::async_trait;
use common::NodeId;
use space::{Ticket, TicketId, TicketSpace};

use crate::registry::PeerRegistry;

/// An operation replayed on a peer's space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replicate {
    /// Upsert the ticket.
    Write(Ticket),

    /// Delete the ticket; absent IDs are ignored.
    Delete(TicketId),
}

impl Replicate {
    /// Returns the ticket this operation touches.
    pub fn ticket_id(&self) -> &TicketId {
        match self {
            Replicate::Write(ticket) => &ticket.id,
            Replicate::Delete(id) => id,
        }
    }

    /// Returns the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Replicate::Write(_) => "write",
            Replicate::Delete(_) => "delete",
        }
    }

    /// Applies the operation to `space`.
    pub async fn apply(self, space: &TicketSpace) {
        match self {
            Replicate::Write(ticket) => space.write(ticket).await,
            Replicate::Delete(id) => space.delete(&id).await,
        }
    }
}

/// A replicated operation together with the node it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub origin: NodeId,
    pub op: Replicate,
}

impl Delivery {
    /// Creates a new delivery.
    pub fn new(origin: NodeId, op: Replicate) -> Self {
        Self { origin, op }
    }
}

/// Strategy for propagating a locally applied operation to peers.
///
/// Implementations must return without waiting for peers to apply the
/// operation; the node's callers never block on replication.
#[async_trait]
pub trait ReplicationSink: Send + Sync {
    /// Propagates `op`, applied locally on `origin`, to the peers in `peers`.
    async fn replicate(&self, origin: &NodeId, peers: &PeerRegistry, op: Replicate);
}

/// Fire-and-forget fan-out: one detached task per peer per operation.
///
/// There is no acknowledgment, no retry and no ordering between peers. A
/// peer that is unreachable when its task runs silently misses the update.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireAndForget;

#[async_trait]
impl ReplicationSink for FireAndForget {
    async fn replicate(&self, origin: &NodeId, peers: &PeerRegistry, op: Replicate) {
        let targets = peers.handles().await;

        for peer in targets {
            let delivery = Delivery::new(origin.clone(), op.clone());
            tokio::spawn(async move {
                let ticket_id = delivery.op.ticket_id().clone();
                let op = delivery.op.as_str();
                match peer.deliver(delivery).await {
                    Ok(()) => {
                        metrics::counter!("replication_deliveries_total", "op" => op)
                            .increment(1);
                    }
                    Err(_) => {
                        metrics::counter!("replication_dropped_total", "op" => op).increment(1);
                        tracing::debug!(
                            peer = %peer.id(),
                            %ticket_id,
                            op,
                            "peer unreachable, update dropped"
                        );
                    }
                }
            });
        }
    }
}
