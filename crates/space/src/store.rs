use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Result, SpaceError, Ticket, TicketId, TicketStatus};

/// Concurrency-safe keyed container of ticket records.
///
/// Any number of reads proceed together; every mutation holds the write lock
/// for the duration of a single operation. Cloning a `TicketSpace` yields a
/// handle to the same underlying records.
#[derive(Debug, Clone, Default)]
pub struct TicketSpace {
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl TicketSpace {
    /// Creates a new empty ticket space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a ticket by ID, replacing any prior record.
    pub async fn write(&self, ticket: Ticket) {
        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.id.clone(), ticket);
        metrics::counter!("space_writes_total").increment(1);
    }

    /// Returns the ticket stored under `id`.
    pub async fn read(&self, id: &TicketId) -> Result<Ticket> {
        let tickets = self.tickets.read().await;
        tickets
            .get(id)
            .cloned()
            .ok_or_else(|| SpaceError::NotFound(id.clone()))
    }

    /// Deletes the ticket stored under `id`.
    ///
    /// Deleting an absent ID is a no-op.
    pub async fn delete(&self, id: &TicketId) {
        self.remove(id).await;
    }

    /// Deletes the ticket stored under `id`, returning the removed record.
    pub async fn remove(&self, id: &TicketId) -> Option<Ticket> {
        let removed = self.tickets.write().await.remove(id);
        if removed.is_some() {
            metrics::counter!("space_deletes_total").increment(1);
        }
        removed
    }

    /// Stores a ticket under an ID that must not already be taken.
    pub async fn insert(&self, ticket: Ticket) -> Result<()> {
        let mut tickets = self.tickets.write().await;
        match tickets.entry(ticket.id.clone()) {
            Entry::Occupied(existing) => Err(SpaceError::InvalidState {
                id: ticket.id,
                actual: existing.get().status,
                requested: ticket.status,
            }),
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                metrics::counter!("space_writes_total").increment(1);
                Ok(())
            }
        }
    }

    /// Marks a ticket as reserved for `ticket.user_id`.
    ///
    /// An absent ticket is stored as a new reservation and `None` is
    /// returned. An `Available` ticket is moved to `Reserved` and its prior
    /// record is returned so the caller can restore it later. The request
    /// must quote the listed price; the listing's price is never changed.
    pub async fn reserve(&self, ticket: Ticket) -> Result<Option<Ticket>> {
        let mut tickets = self.tickets.write().await;
        let prior = match tickets.entry(ticket.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(ticket.with_status(TicketStatus::Reserved));
                None
            }
            Entry::Occupied(mut existing) => {
                let current = existing.get();
                if !current.status.can_reserve() {
                    return Err(SpaceError::InvalidState {
                        id: ticket.id,
                        actual: current.status,
                        requested: TicketStatus::Reserved,
                    });
                }
                if current.price != ticket.price {
                    return Err(SpaceError::PriceMismatch {
                        id: ticket.id,
                        listed: current.price,
                        requested: ticket.price,
                    });
                }
                let prior = current.clone();
                let reserved = Ticket {
                    user_id: ticket.user_id,
                    status: TicketStatus::Reserved,
                    ..prior.clone()
                };
                existing.insert(reserved);
                Some(prior)
            }
        };

        metrics::counter!("space_writes_total").increment(1);
        tracing::debug!(ticket_id = %ticket.id, "ticket reserved");
        Ok(prior)
    }

    /// Moves a stored ticket to `next` if that is a legal single step.
    pub async fn transition(&self, id: &TicketId, next: TicketStatus) -> Result<Ticket> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(id)
            .ok_or_else(|| SpaceError::NotFound(id.clone()))?;

        if !ticket.status.can_transition_to(next) {
            return Err(SpaceError::InvalidState {
                id: id.clone(),
                actual: ticket.status,
                requested: next,
            });
        }

        let previous = ticket.status;
        ticket.status = next;
        metrics::counter!("space_writes_total").increment(1);
        tracing::debug!(ticket_id = %id, from = %previous, to = %next, "ticket status changed");
        Ok(ticket.clone())
    }

    /// Returns true if a ticket is stored under `id`.
    pub async fn contains(&self, id: &TicketId) -> bool {
        self.tickets.read().await.contains_key(id)
    }

    /// Returns the number of stored tickets.
    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    /// Returns true if the space holds no tickets.
    pub async fn is_empty(&self) -> bool {
        self.tickets.read().await.is_empty()
    }

    /// Returns a copy of every stored ticket, ordered by ID.
    pub async fn snapshot(&self) -> Vec<Ticket> {
        let tickets = self.tickets.read().await;
        let mut all: Vec<_> = tickets.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn ticket(id: &str, status: TicketStatus) -> Ticket {
        Ticket::new(id, "C1", "U1", Money::from_dollars(50), status)
    }

    #[tokio::test]
    async fn write_then_read_returns_same_ticket() {
        let space = TicketSpace::new();
        let t = ticket("T1", TicketStatus::Booked);

        space.write(t.clone()).await;

        assert_eq!(space.read(&t.id).await.unwrap(), t);
    }

    #[tokio::test]
    async fn write_overwrites_prior_record() {
        let space = TicketSpace::new();
        space.write(ticket("T1", TicketStatus::Reserved)).await;
        space.write(ticket("T1", TicketStatus::Booked)).await;

        let stored = space.read(&TicketId::from("T1")).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Booked);
        assert_eq!(space.len().await, 1);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let space = TicketSpace::new();
        let id = TicketId::from("missing");

        assert_eq!(space.read(&id).await, Err(SpaceError::NotFound(id.clone())));
    }

    #[tokio::test]
    async fn delete_removes_ticket() {
        let space = TicketSpace::new();
        let t = ticket("T1", TicketStatus::Booked);
        space.write(t.clone()).await;

        space.delete(&t.id).await;

        assert!(matches!(
            space.read(&t.id).await,
            Err(SpaceError::NotFound(_))
        ));
        assert!(space.is_empty().await);
    }

    #[tokio::test]
    async fn delete_absent_id_is_noop() {
        let space = TicketSpace::new();
        space.write(ticket("T1", TicketStatus::Booked)).await;

        space.delete(&TicketId::from("T2")).await;

        assert_eq!(space.len().await, 1);
        assert!(space.remove(&TicketId::from("T2")).await.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_existing_id() {
        let space = TicketSpace::new();
        space.insert(ticket("T1", TicketStatus::Booked)).await.unwrap();

        let result = space.insert(ticket("T1", TicketStatus::Booked)).await;

        assert_eq!(
            result,
            Err(SpaceError::InvalidState {
                id: TicketId::from("T1"),
                actual: TicketStatus::Booked,
                requested: TicketStatus::Booked,
            })
        );
    }

    #[tokio::test]
    async fn reserve_absent_ticket_creates_reservation() {
        let space = TicketSpace::new();

        let prior = space
            .reserve(ticket("T1", TicketStatus::Available))
            .await
            .unwrap();

        assert!(prior.is_none());
        let stored = space.read(&TicketId::from("T1")).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Reserved);
    }

    #[tokio::test]
    async fn reserve_available_ticket_returns_prior() {
        let space = TicketSpace::new();
        let available = Ticket::new(
            "T1",
            "C1",
            "nobody",
            Money::from_dollars(75),
            TicketStatus::Available,
        );
        space.write(available.clone()).await;

        let prior = space
            .reserve(ticket("T1", TicketStatus::Available))
            .await
            .unwrap();

        assert_eq!(prior, Some(available));
        let stored = space.read(&TicketId::from("T1")).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Reserved);
        assert_eq!(stored.user_id.as_str(), "U1");
        assert_eq!(stored.price, Money::from_dollars(75));
    }

    #[tokio::test]
    async fn reserve_taken_ticket_is_invalid_state() {
        let space = TicketSpace::new();
        space.write(ticket("T1", TicketStatus::Booked)).await;

        let result = space.reserve(ticket("T1", TicketStatus::Available)).await;

        assert!(matches!(
            result,
            Err(SpaceError::InvalidState {
                actual: TicketStatus::Booked,
                requested: TicketStatus::Reserved,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn reserve_at_other_price_is_rejected_and_listing_kept() {
        let space = TicketSpace::new();
        let listed = Ticket::new("T1", "C1", "", Money::from_cents(7500), TicketStatus::Available);
        space.write(listed.clone()).await;

        let lowball = Ticket::new("T1", "C1", "U1", Money::from_cents(1), TicketStatus::Available);
        let result = space.reserve(lowball).await;

        assert_eq!(
            result,
            Err(SpaceError::PriceMismatch {
                id: TicketId::from("T1"),
                listed: Money::from_cents(7500),
                requested: Money::from_cents(1),
            })
        );
        assert_eq!(space.read(&TicketId::from("T1")).await.unwrap(), listed);
    }

    #[tokio::test]
    async fn transition_follows_state_machine() {
        let space = TicketSpace::new();
        let id = TicketId::from("T1");
        space.write(ticket("T1", TicketStatus::Reserved)).await;

        let booked = space.transition(&id, TicketStatus::Booked).await.unwrap();
        assert_eq!(booked.status, TicketStatus::Booked);

        let result = space.transition(&id, TicketStatus::Available).await;
        assert!(matches!(result, Err(SpaceError::InvalidState { .. })));

        let missing = space
            .transition(&TicketId::from("T9"), TicketStatus::Booked)
            .await;
        assert!(matches!(missing, Err(SpaceError::NotFound(_))));
    }

    #[tokio::test]
    async fn snapshot_is_sorted_by_id() {
        let space = TicketSpace::new();
        space.write(ticket("T2", TicketStatus::Booked)).await;
        space.write(ticket("T1", TicketStatus::Booked)).await;

        let ids: Vec<_> = space
            .snapshot()
            .await
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, ["T1", "T2"]);
    }

    #[tokio::test]
    async fn clones_share_records() {
        let space = TicketSpace::new();
        let handle = space.clone();

        handle.write(ticket("T1", TicketStatus::Booked)).await;

        assert!(space.contains(&TicketId::from("T1")).await);
    }
}
