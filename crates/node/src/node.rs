//! A single node of the replicated ticket space.

use std::sync::Arc;

use common::{ConcertId, NodeId, UserId};
use events::{EventChannel, TicketEvent};
use space::{Ticket, TicketId, TicketSpace, TicketStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::ids::{RandomTicketIds, TicketIds};
use crate::pricing::{FlatPrice, PriceList};
use crate::registry::{PeerHandle, PeerRegistry};
use crate::replication::{Delivery, FireAndForget, Replicate, ReplicationSink};

/// Default bound of a node's replication inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

/// Builder for [`Node`].
pub struct NodeBuilder {
    id: NodeId,
    events: EventChannel,
    inbox_capacity: usize,
    prices: Arc<dyn PriceList>,
    ids: Arc<dyn TicketIds>,
    sink: Arc<dyn ReplicationSink>,
}

impl NodeBuilder {
    /// Sets how many inbound deliveries may queue before senders wait.
    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity.max(1);
        self
    }

    /// Sets the price list used for purchases.
    pub fn price_list(mut self, prices: Arc<dyn PriceList>) -> Self {
        self.prices = prices;
        self
    }

    /// Sets where purchased tickets get their IDs.
    pub fn ticket_ids(mut self, ids: Arc<dyn TicketIds>) -> Self {
        self.ids = ids;
        self
    }

    /// Sets the strategy used to propagate local changes to peers.
    pub fn replication_sink(mut self, sink: Arc<dyn ReplicationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the node and starts its replication inbox.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Node {
        let space = TicketSpace::new();
        let (inbox, rx) = mpsc::channel(self.inbox_capacity);
        let inbox_task = tokio::spawn(run_inbox(self.id.clone(), space.clone(), rx));

        Node {
            id: self.id,
            space,
            peers: PeerRegistry::new(),
            events: self.events,
            prices: self.prices,
            ids: self.ids,
            sink: self.sink,
            inbox,
            inbox_task,
        }
    }
}

/// Applies deliveries from peers to the local space until the inbox closes.
async fn run_inbox(id: NodeId, space: TicketSpace, mut rx: mpsc::Receiver<Delivery>) {
    while let Some(delivery) = rx.recv().await {
        tracing::trace!(
            node = %id,
            origin = %delivery.origin,
            op = delivery.op.as_str(),
            ticket_id = %delivery.op.ticket_id(),
            "applying replicated operation"
        );
        delivery.op.apply(&space).await;
    }
}

/// A processing unit owning one ticket space and a registry of peers.
///
/// Dropping the node stops its inbox; peers that still hold its handle then
/// drop whatever they send it.
pub struct Node {
    id: NodeId,
    space: TicketSpace,
    peers: PeerRegistry,
    events: EventChannel,
    prices: Arc<dyn PriceList>,
    ids: Arc<dyn TicketIds>,
    sink: Arc<dyn ReplicationSink>,
    inbox: mpsc::Sender<Delivery>,
    inbox_task: JoinHandle<()>,
}

impl Node {
    /// Creates a node with default pricing and fire-and-forget replication.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(id: impl Into<NodeId>, events: EventChannel) -> Self {
        Self::builder(id, events).build()
    }

    /// Returns a builder for a node publishing on `events`.
    pub fn builder(id: impl Into<NodeId>, events: EventChannel) -> NodeBuilder {
        NodeBuilder {
            id: id.into(),
            events,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            prices: Arc::new(FlatPrice::default()),
            ids: Arc::new(RandomTicketIds),
            sink: Arc::new(FireAndForget),
        }
    }

    /// Returns the node ID.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the node's ticket space.
    pub fn space(&self) -> &TicketSpace {
        &self.space
    }

    /// Returns a handle other nodes can register to replicate into this one.
    pub fn handle(&self) -> PeerHandle {
        PeerHandle::new(self.id.clone(), self.inbox.clone())
    }

    /// Registers `peer` as a replication target.
    #[tracing::instrument(skip(self, peer), fields(node = %self.id, peer = %peer.id()))]
    pub async fn add_peer(&self, peer: PeerHandle) {
        if peer.id() == &self.id {
            tracing::warn!("refusing to register node as its own peer");
            return;
        }
        if self.peers.insert(peer).await.is_some() {
            tracing::debug!("replaced existing peer handle");
        }
    }

    /// Unregisters the peer with `peer_id`. Returns false if it was not registered.
    #[tracing::instrument(skip(self), fields(node = %self.id))]
    pub async fn remove_peer(&self, peer_id: &NodeId) -> bool {
        self.peers.remove(peer_id).await.is_some()
    }

    /// Returns the IDs of the registered peers in sorted order.
    pub async fn peer_ids(&self) -> Vec<NodeId> {
        self.peers.ids().await
    }

    /// Purchases a ticket and replicates it to all peers.
    ///
    /// The ticket is stored locally as `Booked`, handed to the replication
    /// sink and announced as `TicketPurchased`. Returns without waiting for
    /// any peer to apply it.
    ///
    /// Fails with `InvalidState` if the minted ID is already stored; in that
    /// case nothing is propagated or published.
    #[tracing::instrument(skip(self), fields(node = %self.id))]
    pub async fn purchase_ticket(&self, concert_id: ConcertId, user_id: UserId) -> Result<Ticket> {
        let price = self.prices.price_for(&concert_id);
        let ticket = Ticket::new(
            self.ids.next_id(),
            concert_id,
            user_id,
            price,
            TicketStatus::Booked,
        );

        self.space.insert(ticket.clone()).await?;
        self.sink
            .replicate(&self.id, &self.peers, Replicate::Write(ticket.clone()))
            .await;
        self.events
            .publish(TicketEvent::purchased(
                self.id.clone(),
                ticket.id.clone(),
                ticket.concert_id.clone(),
                ticket.user_id.clone(),
            ))
            .await;

        metrics::counter!("node_purchases_total").increment(1);
        tracing::info!(ticket_id = %ticket.id, %price, "ticket purchased");
        Ok(ticket)
    }

    /// Cancels a ticket and replicates the deletion to all peers.
    ///
    /// Fails with `NotFound` if the ticket is not in the local space; in that
    /// case nothing is propagated or published.
    #[tracing::instrument(skip(self), fields(node = %self.id))]
    pub async fn cancel_ticket(&self, ticket_id: &TicketId) -> Result<()> {
        let removed = self
            .space
            .remove(ticket_id)
            .await
            .ok_or_else(|| space::SpaceError::NotFound(ticket_id.clone()))?;

        self.sink
            .replicate(&self.id, &self.peers, Replicate::Delete(removed.id.clone()))
            .await;
        self.events
            .publish(TicketEvent::cancelled(self.id.clone(), removed.id))
            .await;

        metrics::counter!("node_cancellations_total").increment(1);
        tracing::info!(%ticket_id, "ticket cancelled");
        Ok(())
    }

    /// Stops accepting deliveries from peers.
    ///
    /// Local operations keep working; only inbound replication stops.
    pub fn shutdown(&self) {
        self.inbox_task.abort();
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.inbox_task.abort();
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use common::Money;
    use events::{EventKind, handler_fn};
    use space::SpaceError;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_purchase_stores_booked_ticket_locally() {
        let node = Node::new("Node1", EventChannel::new());

        let ticket = node
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Booked);
        assert_eq!(ticket.price, Money::from_dollars(50));
        assert_eq!(node.space().read(&ticket.id).await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn test_purchase_uses_price_list() {
        let node = Node::builder("Node1", EventChannel::new())
            .price_list(Arc::new(FlatPrice(Money::from_cents(7250))))
            .build();

        let ticket = node
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();

        assert_eq!(ticket.price, Money::from_cents(7250));
    }

    #[tokio::test]
    async fn test_purchase_publishes_event() {
        let events = EventChannel::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events
            .subscribe(
                EventKind::TicketPurchased,
                handler_fn(move |event| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(event);
                    }
                }),
            )
            .await;
        let node = Node::new("Node1", events);

        let ticket = node
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            TicketEvent::TicketPurchased(data) => {
                assert_eq!(data.origin, *node.id());
                assert_eq!(data.ticket_id, ticket.id);
                assert_eq!(data.concert_id.as_str(), "C1");
                assert_eq!(data.user_id.as_str(), "U1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    /// Hands out the same ID every time.
    struct FixedId(&'static str);

    impl TicketIds for FixedId {
        fn next_id(&self) -> TicketId {
            TicketId::from(self.0)
        }
    }

    #[tokio::test]
    async fn test_purchase_with_taken_id_is_rejected_and_not_announced() {
        let events = EventChannel::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events
            .subscribe(
                EventKind::TicketPurchased,
                handler_fn(move |event| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(event);
                    }
                }),
            )
            .await;
        let node1 = Node::builder("Node1", events)
            .ticket_ids(Arc::new(FixedId("T1")))
            .build();
        let node2 = Node::new("Node2", EventChannel::new());
        node1.add_peer(node2.handle()).await;

        let first = node1
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();
        let second = node1.purchase_ticket("C2".into(), "U2".into()).await;

        assert_eq!(
            second,
            Err(NodeError::Space(SpaceError::InvalidState {
                id: TicketId::from("T1"),
                actual: TicketStatus::Booked,
                requested: TicketStatus::Booked,
            }))
        );
        assert_eq!(node1.space().read(&first.id).await.unwrap(), first);

        timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(node2.space().snapshot().await, vec![first]);
    }

    #[tokio::test]
    async fn test_cancel_unknown_ticket_is_not_found() {
        let node = Node::new("Node1", EventChannel::new());
        let id = TicketId::from("missing");

        let result = node.cancel_ticket(&id).await;

        assert_eq!(result, Err(NodeError::Space(SpaceError::NotFound(id))));
    }

    #[tokio::test]
    async fn test_cancel_removes_ticket_locally() {
        let node = Node::new("Node1", EventChannel::new());
        let ticket = node
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();

        node.cancel_ticket(&ticket.id).await.unwrap();

        assert!(node.space().is_empty().await);
    }

    #[tokio::test]
    async fn test_add_and_remove_peer() {
        let node1 = Node::new("Node1", EventChannel::new());
        let node2 = Node::new("Node2", EventChannel::new());

        node1.add_peer(node2.handle()).await;
        node1.add_peer(node1.handle()).await;
        assert_eq!(node1.peer_ids().await, vec![NodeId::from("Node2")]);

        assert!(node1.remove_peer(&"Node2".into()).await);
        assert!(!node1.remove_peer(&"Node2".into()).await);
        assert!(node1.peer_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_removed_peer_stops_receiving() {
        let node1 = Node::new("Node1", EventChannel::new());
        let node2 = Node::new("Node2", EventChannel::new());
        node1.add_peer(node2.handle()).await;
        node1.remove_peer(node2.id()).await;

        node1
            .purchase_ticket("C1".into(), "U1".into())
            .await
            .unwrap();
        sleep(Duration::from_millis(50)).await;

        assert!(node2.space().is_empty().await);
    }

    #[tokio::test]
    async fn test_shutdown_makes_node_unreachable() {
        let node = Node::new("Node1", EventChannel::new());
        let handle = node.handle();

        node.shutdown();
        // Give the runtime a chance to drop the aborted inbox task.
        sleep(Duration::from_millis(10)).await;

        assert!(!handle.is_reachable());
    }
}
