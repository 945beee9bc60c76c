//! Saga pattern implementation for ticket booking.
//!
//! A [`Saga`] runs an ordered list of steps. If any step fails, every step
//! that already succeeded is compensated in reverse order and the failing
//! step's error is returned unchanged.
//!
//! The ticket booking saga follows these steps:
//! 1. Reserve the ticket in the space
//! 2. Process payment
//! 3. Send confirmation
//! 4. Mark the ticket booked

pub mod booking;
pub mod coordinator;
pub mod error;
pub mod services;
pub mod state;
pub mod step;
pub mod steps;

pub use booking::{BookingRequest, BookingWorkflow};
pub use coordinator::Saga;
pub use error::{Result, SagaError};
pub use services::{
    InMemoryNotificationService, InMemoryPaymentGateway, Notification, NotificationService,
    PaymentGateway, PaymentInfo,
};
pub use state::SagaState;
pub use step::SagaStep;
pub use steps::{BookStep, ConfirmationStep, PaymentStep, ReserveStep};
