//! Demo entry point: replicates purchases across a cluster, then books
//! tickets through the saga.

use std::sync::Arc;
use std::time::Duration;

use common::NodeId;
use events::{EventChannel, EventKind, TicketEvent, handler_fn};
use node::{Cluster, ClusterConfig, telemetry};
use saga::{BookingRequest, BookingWorkflow, InMemoryNotificationService, InMemoryPaymentGateway};
use space::{Ticket, TicketId, TicketStatus};

/// How long to give fire-and-forget replication before reading replicas.
const SETTLE: Duration = Duration::from_millis(100);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. Initialize tracing
    let config = ClusterConfig::from_env();
    telemetry::init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Wire the event channel and the cluster
    let events = EventChannel::new();
    for kind in [EventKind::TicketPurchased, EventKind::TicketCancelled] {
        events
            .subscribe(
                kind,
                handler_fn(|event: TicketEvent| async move {
                    tracing::info!(
                        kind = %event.kind(),
                        ticket_id = %event.ticket_id(),
                        "event received"
                    );
                }),
            )
            .await;
    }
    let cluster = Cluster::from_config(&config, events).await?;
    let nodes = cluster.nodes();

    // 4. Purchase on the first node, cancel on the last
    let first = &nodes[0];
    let last = &nodes[nodes.len() - 1];
    let ticket = first.purchase_ticket("Concert1".into(), "User1".into()).await?;
    tokio::time::sleep(SETTLE).await;
    report(&cluster, &ticket.id).await;

    match last.cancel_ticket(&ticket.id).await {
        Ok(()) => tracing::info!(node = %last.id(), "cancelled replicated ticket"),
        Err(error) => tracing::warn!(node = %last.id(), %error, "cancel failed"),
    }
    tokio::time::sleep(SETTLE).await;
    report(&cluster, &ticket.id).await;

    // 5. Book through the saga on one node's space
    let gateway = InMemoryPaymentGateway::new();
    let notifier = InMemoryNotificationService::new();
    let workflow = BookingWorkflow::new(
        first.space().clone(),
        Arc::new(gateway.clone()),
        Arc::new(notifier.clone()),
    );

    let listed = Ticket::new(
        TicketId::new(),
        "Concert1",
        "User2",
        config.ticket_price,
        TicketStatus::Available,
    );
    match workflow.book(BookingRequest::new(listed)).await {
        Ok(booked) => tracing::info!(ticket_id = %booked.id, status = %booked.status, "booking succeeded"),
        Err(error) => tracing::warn!(%error, "booking failed"),
    }

    gateway.set_fail_on_charge(true);
    let declined = Ticket::new(
        TicketId::new(),
        "Concert1",
        "User3",
        config.ticket_price,
        TicketStatus::Available,
    );
    let declined_id = declined.id.clone();
    if let Err(error) = workflow.book(BookingRequest::new(declined)).await {
        let left_behind = first.space().contains(&declined_id).await;
        tracing::warn!(%error, left_behind, "booking failed");
    }
    tracing::info!(
        payments = gateway.payment_count(),
        notifications = notifier.sent().len(),
        "saga services"
    );

    // 6. Shut down and dump metrics
    cluster.shutdown();
    println!("{}", metrics_handle.render());
    Ok(())
}

/// Logs which nodes currently hold `ticket_id`.
async fn report(cluster: &Cluster, ticket_id: &TicketId) {
    let mut holders: Vec<&NodeId> = Vec::new();
    for node in cluster.nodes() {
        if node.space().contains(ticket_id).await {
            holders.push(node.id());
        }
    }
    tracing::info!(%ticket_id, ?holders, "replica report");
}
