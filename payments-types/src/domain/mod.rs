//! Domain models for the payment router.

pub mod amount;
pub mod currency;
pub mod payment;

pub use amount::Amount;
pub use currency::Currency;
pub use payment::{Payment, PaymentId, PaymentStatus};
