//! Orders and their payment state as the reporting side sees them.
//!
//! The order subsystem owns these records; this crate only models them and
//! exposes a read-only access trait plus an in-memory implementation.

pub mod in_memory;
pub mod model;
pub mod reader;

pub use in_memory::{InMemorySalesStore, SalesSnapshot};
pub use model::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
pub use reader::SalesReader;
