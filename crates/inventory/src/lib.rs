//! Inventory entities as the reporting side sees them.
//!
//! The inventory subsystem owns these records; this crate only models them and
//! exposes a read-only access trait plus an in-memory implementation.

pub mod in_memory;
pub mod model;
pub mod reader;

pub use in_memory::{InMemoryInventoryStore, InventorySnapshot};
pub use model::{
    AdjustmentStatus, Branch, BranchStock, Category, InventoryAdjustment, InventoryTransaction,
    Product, TransactionType,
};
pub use reader::InventoryReader;
