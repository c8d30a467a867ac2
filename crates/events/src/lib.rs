//! Live order update relay for kitchen displays.
//!
//! Order, order-item and payment changes are published as [`OrderEvent`]s and
//! fanned out to every WebSocket connection in the matching groups.

pub mod message;
pub mod relay;
pub mod topic;

pub use message::{Action, ClientMessage, OrderEvent};
pub use relay::{Connection, ConnectionId, Frame, OrderRelay};
pub use topic::Topic;
