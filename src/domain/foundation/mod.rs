//! Foundation value objects shared across the domain.

mod ids;
mod money;
mod timestamp;

pub use ids::{OrderId, PaymentId, ProductId, UserId};
pub use money::{to_minor_units, MoneyError};
pub use timestamp::Timestamp;
