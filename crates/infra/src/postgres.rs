//! Postgres-backed snapshot loader.
//!
//! Reads the inventory and order tables once and hands back snapshots for the
//! in-memory stores. Reports never query the database directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use tillpoint_core::{
    AdjustmentId, BranchId, CategoryId, DomainError, OrderId, OrderItemId, ProductId, TransactionId,
};
use tillpoint_inventory::{
    AdjustmentStatus, Branch, BranchStock, Category, InventoryAdjustment, InventorySnapshot,
    InventoryTransaction, Product, TransactionType,
};
use tillpoint_sales::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, SalesSnapshot};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("bad value in {table}: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: DomainError,
    },
}

pub struct PostgresSnapshotLoader {
    pool: Arc<PgPool>,
}

impl PostgresSnapshotLoader {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, LoadError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Load every inventory table into a snapshot.
    pub async fn load_inventory(&self) -> Result<InventorySnapshot, LoadError> {
        let snapshot = InventorySnapshot {
            categories: self.categories().await?,
            branches: self.branches().await?,
            products: self.products().await?,
            branch_stocks: self.branch_stocks().await?,
            transactions: self.transactions().await?,
            adjustments: self.adjustments().await?,
        };

        info!(
            products = snapshot.products.len(),
            branch_stocks = snapshot.branch_stocks.len(),
            transactions = snapshot.transactions.len(),
            adjustments = snapshot.adjustments.len(),
            "inventory snapshot loaded from postgres"
        );
        Ok(snapshot)
    }

    /// Load orders and their lines into a snapshot.
    pub async fn load_sales(&self) -> Result<SalesSnapshot, LoadError> {
        let snapshot = SalesSnapshot {
            orders: self.orders().await?,
            order_items: self.order_items().await?,
        };

        info!(
            orders = snapshot.orders.len(),
            order_items = snapshot.order_items.len(),
            "sales snapshot loaded from postgres"
        );
        Ok(snapshot)
    }

    async fn categories(&self) -> Result<Vec<Category>, LoadError> {
        let rows = sqlx::query("SELECT id, name FROM categories")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Category, LoadError> {
                Ok(Category {
                    id: CategoryId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn branches(&self) -> Result<Vec<Branch>, LoadError> {
        let rows = sqlx::query("SELECT id, name FROM branches")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Branch, LoadError> {
                Ok(Branch {
                    id: BranchId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn products(&self) -> Result<Vec<Product>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sku, name, category_id, cost_price, selling_price, unit, is_active
            FROM products
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Product, LoadError> {
                Ok(Product {
                    id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    sku: row.try_get("sku")?,
                    name: row.try_get("name")?,
                    category_id: row
                        .try_get::<Option<Uuid>, _>("category_id")?
                        .map(CategoryId::from_uuid),
                    cost_price: row.try_get::<Decimal, _>("cost_price")?,
                    selling_price: row.try_get::<Decimal, _>("selling_price")?,
                    unit: row.try_get("unit")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect()
    }

    async fn branch_stocks(&self) -> Result<Vec<BranchStock>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, branch_id, current_stock, reorder_level, is_active
            FROM branch_stocks
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<BranchStock, LoadError> {
                Ok(BranchStock {
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    branch_id: BranchId::from_uuid(row.try_get::<Uuid, _>("branch_id")?),
                    current_stock: row.try_get::<Decimal, _>("current_stock")?,
                    reorder_level: row.try_get::<Decimal, _>("reorder_level")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect()
    }

    async fn transactions(&self) -> Result<Vec<InventoryTransaction>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, branch_id, transaction_type, quantity,
                   reference, created_by, created_at
            FROM inventory_transactions
            ORDER BY created_at
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn adjustments(&self) -> Result<Vec<InventoryAdjustment>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, branch_id, transaction_type, quantity_before,
                   quantity_after, reason, status, requested_by, reviewed_by, created_at
            FROM inventory_adjustments
            ORDER BY created_at
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(adjustment_from_row).collect()
    }

    async fn orders(&self) -> Result<Vec<Order>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, branch_id, status, total_amount,
                   payment_status, payment_method, created_at
            FROM orders
            ORDER BY created_at
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn order_items(&self) -> Result<Vec<OrderItem>, LoadError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<OrderItem, LoadError> {
                Ok(OrderItem {
                    id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    quantity: row.try_get::<Decimal, _>("quantity")?,
                    unit_price: row.try_get::<Decimal, _>("unit_price")?,
                })
            })
            .collect()
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, LoadError> {
    let decode = |source: DomainError| LoadError::Decode {
        table: "orders",
        source,
    };
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    // Unsettled orders store an empty method.
    let payment_method = match row.try_get::<Option<String>, _>("payment_method")? {
        Some(method) if !method.trim().is_empty() => {
            Some(method.trim().parse::<PaymentMethod>().map_err(decode)?)
        }
        _ => None,
    };

    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        order_number: row.try_get("order_number")?,
        branch_id: BranchId::from_uuid(row.try_get::<Uuid, _>("branch_id")?),
        status: status.parse::<OrderStatus>().map_err(decode)?,
        total_amount: row.try_get::<Decimal, _>("total_amount")?,
        payment_status: payment_status.parse::<PaymentStatus>().map_err(decode)?,
        payment_method,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<InventoryTransaction, LoadError> {
    let kind: String = row.try_get("transaction_type")?;
    Ok(InventoryTransaction {
        id: TransactionId::from_uuid(row.try_get::<Uuid, _>("id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        branch_id: row
            .try_get::<Option<Uuid>, _>("branch_id")?
            .map(BranchId::from_uuid),
        transaction_type: kind.parse::<TransactionType>().map_err(|source| LoadError::Decode {
            table: "inventory_transactions",
            source,
        })?,
        quantity: row.try_get::<Decimal, _>("quantity")?,
        reference: row
            .try_get::<Option<String>, _>("reference")?
            .unwrap_or_default(),
        created_by: row.try_get("created_by")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn adjustment_from_row(row: &PgRow) -> Result<InventoryAdjustment, LoadError> {
    let decode = |source: DomainError| LoadError::Decode {
        table: "inventory_adjustments",
        source,
    };
    let kind: String = row.try_get("transaction_type")?;
    let status: String = row.try_get("status")?;

    Ok(InventoryAdjustment {
        id: AdjustmentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        branch_id: row
            .try_get::<Option<Uuid>, _>("branch_id")?
            .map(BranchId::from_uuid),
        transaction_type: kind.parse::<TransactionType>().map_err(decode)?,
        quantity_before: row.try_get::<Decimal, _>("quantity_before")?,
        quantity_after: row.try_get::<Decimal, _>("quantity_after")?,
        reason: row.try_get::<Option<String>, _>("reason")?.unwrap_or_default(),
        status: status.parse::<AdjustmentStatus>().map_err(decode)?,
        requested_by: row.try_get("requested_by")?,
        reviewed_by: row.try_get("reviewed_by")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
