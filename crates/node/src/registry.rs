//! Per-node registry of peer endpoints.

use std::collections::HashMap;

use common::NodeId;
use tokio::sync::{RwLock, mpsc};

use crate::replication::Delivery;

/// Addressable endpoint of a peer node.
///
/// A handle is only the sending half of the peer's replication inbox: it
/// never grants access to the peer's space or registry, so holding one does
/// not create an ownership cycle between nodes.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: NodeId,
    inbox: mpsc::Sender<Delivery>,
}

impl PeerHandle {
    /// Creates a handle that delivers into `inbox`.
    pub fn new(id: NodeId, inbox: mpsc::Sender<Delivery>) -> Self {
        Self { id, inbox }
    }

    /// Returns the peer's node ID.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns false once the peer has stopped accepting deliveries.
    pub fn is_reachable(&self) -> bool {
        !self.inbox.is_closed()
    }

    /// Hands `delivery` to the peer, waiting for inbox capacity if needed.
    ///
    /// Gives the delivery back if the peer is unreachable.
    pub async fn deliver(&self, delivery: Delivery) -> Result<(), Delivery> {
        self.inbox.send(delivery).await.map_err(|e| e.0)
    }
}

/// Mapping of peer ID to peer handle.
///
/// Mutations take the write lock; fan-out takes the read lock only long
/// enough to copy the current handles.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<NodeId, PeerHandle>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `peer`, returning the handle it replaced, if any.
    pub async fn insert(&self, peer: PeerHandle) -> Option<PeerHandle> {
        self.peers.write().await.insert(peer.id.clone(), peer)
    }

    /// Unregisters the peer with `id`, returning its handle if it was present.
    pub async fn remove(&self, id: &NodeId) -> Option<PeerHandle> {
        self.peers.write().await.remove(id)
    }

    /// Returns a copy of every registered handle.
    pub async fn handles(&self) -> Vec<PeerHandle> {
        self.peers.read().await.values().cloned().collect()
    }

    /// Returns the registered peer IDs in sorted order.
    pub async fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.peers.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
