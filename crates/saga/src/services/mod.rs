//! External service traits and in-memory implementations for saga steps.

pub mod notification;
pub mod payment;

pub use notification::{InMemoryNotificationService, Notification, NotificationService};
pub use payment::{InMemoryPaymentGateway, PaymentGateway, PaymentInfo};
