//! Application services for notification generation and dismissal.

mod generator;

pub use generator::{NotificationService, NotificationServiceError, NotificationServiceResult};
