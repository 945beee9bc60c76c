//! Concrete steps of the ticket booking saga.

pub mod book;
pub mod confirmation;
pub mod payment;
pub mod reserve;

pub use book::BookStep;
pub use confirmation::ConfirmationStep;
pub use payment::PaymentStep;
pub use reserve::ReserveStep;
