use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{
    AdjustmentId, BranchId, CategoryId, DomainError, Entity, ProductId, TransactionId,
};

/// Product category (menu section, ingredient group, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
        }
    }
}

/// Physical location holding its own stock levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BranchId::new(),
            name: name.into(),
        }
    }
}

/// Catalog product. Shared across branches; never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    /// Unit of measure label (`kg`, `l`, `pcs`, ...).
    pub unit: Option<String>,
    pub is_active: bool,
}

impl Product {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        cost_price: Decimal,
        selling_price: Decimal,
    ) -> Self {
        Self {
            id: ProductId::new(),
            sku: sku.into(),
            name: name.into(),
            category_id: None,
            cost_price,
            selling_price,
            unit: None,
            is_active: true,
        }
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Unit label shown in reports.
    pub fn unit_label(&self) -> &str {
        self.unit.as_deref().unwrap_or("pcs")
    }
}

/// Current quantity of one product at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStock {
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub current_stock: Decimal,
    pub reorder_level: Decimal,
    pub is_active: bool,
}

impl BranchStock {
    pub fn new(
        product_id: ProductId,
        branch_id: BranchId,
        current_stock: Decimal,
        reorder_level: Decimal,
    ) -> Self {
        Self {
            product_id,
            branch_id,
            current_stock,
            reorder_level,
            is_active: true,
        }
    }
}

/// Kind of stock-affecting event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Sale,
    Return,
    Adjustment,
    Transfer,
    Waste,
    Production,
}

impl TransactionType {
    pub const ALL: [TransactionType; 7] = [
        TransactionType::Purchase,
        TransactionType::Sale,
        TransactionType::Return,
        TransactionType::Adjustment,
        TransactionType::Transfer,
        TransactionType::Waste,
        TransactionType::Production,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Sale => "sale",
            TransactionType::Return => "return",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Transfer => "transfer",
            TransactionType::Waste => "waste",
            TransactionType::Production => "production",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown transaction type '{s}' (expected one of: purchase, sale, return, adjustment, transfer, waste, production)"
                ))
            })
    }
}

/// Immutable stock movement log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub product_id: ProductId,
    pub branch_id: Option<BranchId>,
    pub transaction_type: TransactionType,
    /// Always positive; direction is implied by `transaction_type`.
    pub quantity: Decimal,
    pub reference: String,
    /// Display name of the user who recorded the movement.
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryTransaction {
    pub fn new(
        product_id: ProductId,
        branch_id: Option<BranchId>,
        transaction_type: TransactionType,
        quantity: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            product_id,
            branch_id,
            transaction_type,
            quantity,
            reference: String::new(),
            created_by: None,
            created_at,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = Some(user.into());
        self
    }
}

/// Review state of a manual adjustment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdjustmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for AdjustmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AdjustmentStatus::Pending),
            "approved" => Ok(AdjustmentStatus::Approved),
            "rejected" => Ok(AdjustmentStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "unknown adjustment status '{other}' (expected pending, approved or rejected)"
            ))),
        }
    }
}

/// Proposed stock correction awaiting (or past) review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    pub id: AdjustmentId,
    pub product_id: ProductId,
    pub branch_id: Option<BranchId>,
    /// Movement classification the correction is filed under.
    pub transaction_type: TransactionType,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub requested_by: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryAdjustment {
    pub fn new(
        product_id: ProductId,
        branch_id: Option<BranchId>,
        quantity_before: Decimal,
        quantity_after: Decimal,
        reason: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AdjustmentId::new(),
            product_id,
            branch_id,
            transaction_type: TransactionType::Adjustment,
            quantity_before,
            quantity_after,
            reason: reason.into(),
            status: AdjustmentStatus::Pending,
            requested_by: None,
            reviewed_by: None,
            created_at,
        }
    }

    pub fn filed_as(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn requested_by(mut self, user: impl Into<String>) -> Self {
        self.requested_by = Some(user.into());
        self
    }

    pub fn reviewed(mut self, status: AdjustmentStatus, reviewer: impl Into<String>) -> Self {
        self.status = status;
        self.reviewed_by = Some(reviewer.into());
        self
    }

    /// Signed change the adjustment applies (`after - before`).
    pub fn quantity_delta(&self) -> Decimal {
        self.quantity_after - self.quantity_before
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Entity for Branch {
    type Id = BranchId;

    fn id(&self) -> BranchId {
        self.id
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Entity for InventoryTransaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}

impl Entity for InventoryAdjustment {
    type Id = AdjustmentId;

    fn id(&self) -> AdjustmentId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transaction_type_parses_case_insensitively() {
        assert_eq!("WASTE".parse::<TransactionType>().unwrap(), TransactionType::Waste);
        assert!("gift".parse::<TransactionType>().is_err());
    }

    #[test]
    fn adjustment_delta_is_after_minus_before() {
        let adj = InventoryAdjustment::new(
            ProductId::new(),
            None,
            dec!(12.5),
            dec!(10),
            "spoiled",
            Utc::now(),
        );
        assert_eq!(adj.quantity_delta(), dec!(-2.5));
        assert_eq!(adj.status, AdjustmentStatus::Pending);
    }

    #[test]
    fn unit_label_defaults_to_pieces() {
        let p = Product::new("SKU-1", "Lemon", dec!(0.2), dec!(0.5));
        assert_eq!(p.unit_label(), "pcs");
        assert_eq!(p.with_unit("kg").unit_label(), "kg");
    }
}
