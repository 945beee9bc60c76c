//! In-process publish/subscribe channel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::event::{EventKind, TicketEvent};

/// A subscriber to ticket events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one published event.
    async fn handle(&self, event: TicketEvent);
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(TicketEvent) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: TicketEvent) {
        (self.0)(event).await;
    }
}

/// Wraps an async closure as an [`EventHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(TicketEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Fan-out channel for [`TicketEvent`]s.
///
/// Every publish dispatches to each current subscriber of the event's kind in
/// its own task: there is no ordering between subscribers and a slow
/// subscriber never holds up the publisher or the other subscribers.
/// Subscriptions only see events published after they were registered.
///
/// Cloning yields a handle to the same set of subscriptions.
#[derive(Clone, Default)]
pub struct EventChannel {
    subscribers: Arc<RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>>,
}

impl EventChannel {
    /// Creates a channel with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for future events of `kind`.
    pub async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.subscribers
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(handler);
        tracing::debug!(%kind, "event subscriber registered");
    }

    /// Returns the number of subscribers registered for `kind`.
    pub async fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .await
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Publishes `event` to every subscriber of its kind.
    ///
    /// Returns the number of subscribers the event was dispatched to. Must be
    /// called from within a Tokio runtime.
    #[tracing::instrument(skip(self, event), fields(kind = %event.kind(), ticket_id = %event.ticket_id()))]
    pub async fn publish(&self, event: TicketEvent) -> usize {
        let handlers = self
            .subscribers
            .read()
            .await
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for handler in &handlers {
            let handler = Arc::clone(handler);
            let event = event.clone();
            tokio::spawn(async move {
                handler.handle(event).await;
            });
        }

        metrics::counter!("events_published_total", "kind" => event.kind().as_str())
            .increment(1);
        handlers.len()
    }
}
