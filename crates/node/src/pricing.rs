use common::{ConcertId, Money};

/// Source of ticket prices.
pub trait PriceList: Send + Sync {
    /// Returns the price of one ticket for `concert_id`.
    fn price_for(&self, concert_id: &ConcertId) -> Money;
}

/// Charges the same price for every concert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatPrice(pub Money);

impl Default for FlatPrice {
    fn default() -> Self {
        Self(Money::from_dollars(50))
    }
}

impl PriceList for FlatPrice {
    fn price_for(&self, _concert_id: &ConcertId) -> Money {
        self.0
    }
}
