//! Read-side data access for sales reporting.

use std::sync::Arc;

use tillpoint_core::OrderId;

use crate::model::{Order, OrderItem};

/// Read-only view over persisted orders.
pub trait SalesReader: Send + Sync {
    fn order(&self, id: OrderId) -> Option<Order>;

    /// All orders in any status.
    fn orders(&self) -> Vec<Order>;
    fn order_items(&self) -> Vec<OrderItem>;
}

impl<S> SalesReader for Arc<S>
where
    S: SalesReader + ?Sized,
{
    fn order(&self, id: OrderId) -> Option<Order> {
        (**self).order(id)
    }

    fn orders(&self) -> Vec<Order> {
        (**self).orders()
    }

    fn order_items(&self) -> Vec<OrderItem> {
        (**self).order_items()
    }
}
