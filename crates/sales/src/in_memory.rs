//! In-memory order store for tests/dev and for snapshots loaded at startup.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use tillpoint_core::{Entity, OrderId};

use crate::model::{Order, OrderItem};
use crate::reader::SalesReader;

/// Plain owned copy of the order tables the reports read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSnapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    items: Vec<OrderItem>,
}

/// In-memory order tables. Lock poisoning degrades to "no data".
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    inner: RwLock<Tables>,
}

impl InMemorySalesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SalesSnapshot) -> Self {
        let store = Self::new();
        store.load(snapshot);
        store
    }

    /// Replace both tables with the snapshot contents.
    pub fn load(&self, snapshot: SalesSnapshot) {
        let tables = Tables {
            orders: snapshot.orders.into_iter().map(|o| (o.id(), o)).collect(),
            items: snapshot.order_items,
        };

        if let Ok(mut inner) = self.inner.write() {
            *inner = tables;
        }
    }

    /// Insert or replace an order header.
    pub fn upsert_order(&self, order: Order) {
        if let Ok(mut inner) = self.inner.write() {
            inner.orders.insert(order.id(), order);
        }
    }

    pub fn add_item(&self, item: OrderItem) {
        if let Ok(mut inner) = self.inner.write() {
            inner.items.push(item);
        }
    }
}

impl SalesReader for InMemorySalesStore {
    fn order(&self, id: OrderId) -> Option<Order> {
        self.inner.read().ok()?.orders.get(&id).cloned()
    }

    fn orders(&self) -> Vec<Order> {
        match self.inner.read() {
            Ok(inner) => inner.orders.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn order_items(&self) -> Vec<OrderItem> {
        match self.inner.read() {
            Ok(inner) => inner.items.clone(),
            Err(_) => vec![],
        }
    }
}
