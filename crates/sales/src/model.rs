use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{BranchId, DomainError, Entity, OrderId, OrderItemId, ProductId};

/// Lifecycle state of an order. Only `completed` orders count as sales.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Processing,
    Ready,
    Completed,
    Cancelled,
    Refunded,
    PartialRefund,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::PartialRefund,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::PartialRefund => "partial_refund",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown order status '{s}'")))
    }
}

/// How an order was settled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Cheque,
    BankTransfer,
    Mpesa,
    Paypal,
    OnlinePayment,
    LoyaltyPoints,
    GiftCard,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 10] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Cheque,
        PaymentMethod::BankTransfer,
        PaymentMethod::Mpesa,
        PaymentMethod::Paypal,
        PaymentMethod::OnlinePayment,
        PaymentMethod::LoyaltyPoints,
        PaymentMethod::GiftCard,
        PaymentMethod::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::OnlinePayment => "online_payment",
            PaymentMethod::LoyaltyPoints => "loyalty_points",
            PaymentMethod::GiftCard => "gift_card",
            PaymentMethod::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Mpesa => "M-Pesa",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::OnlinePayment => "Online Payment",
            PaymentMethod::LoyaltyPoints => "Loyalty Points",
            PaymentMethod::GiftCard => "Gift Card",
            PaymentMethod::Other => "Other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown payment method '{s}'")))
    }
}

/// Settlement state of an order's balance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overpaid,
    Refunded,
    PartialRefund,
    Failed,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 7] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::PartiallyPaid,
        PaymentStatus::Overpaid,
        PaymentStatus::Refunded,
        PaymentStatus::PartialRefund,
        PaymentStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Overpaid => "overpaid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartialRefund => "partial_refund",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown payment status '{s}'")))
    }
}

/// Customer order header. Line items live in [`OrderItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub branch_id: BranchId,
    pub status: OrderStatus,
    /// Final total after tax and discounts.
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    /// Unset until the order is settled.
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_number: impl Into<String>,
        branch_id: BranchId,
        total_amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            order_number: order_number.into(),
            branch_id,
            status: OrderStatus::Draft,
            total_amount,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            created_at,
        }
    }

    /// Mark the order completed and paid with `method`.
    pub fn paid_with(mut self, method: PaymentMethod) -> Self {
        self.status = OrderStatus::Completed;
        self.payment_status = PaymentStatus::Paid;
        self.payment_method = Some(method);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// One product line on an order, priced at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: OrderItemId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> OrderItemId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_orders_are_unsettled_drafts() {
        let order = Order::new("ORD-1", BranchId::new(), dec!(12), Utc::now());
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.payment_method, None);
        assert!(!order.is_completed());

        let order = order.paid_with(PaymentMethod::Mpesa);
        assert!(order.is_completed());
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn payment_method_wire_names() {
        assert_eq!("BANK_TRANSFER".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!(PaymentMethod::Mpesa.display_name(), "M-Pesa");
        assert!("barter".parse::<PaymentMethod>().is_err());
        assert_eq!(
            "partial_refund".parse::<OrderStatus>().unwrap(),
            OrderStatus::PartialRefund
        );
    }

    #[test]
    fn item_subtotal_is_quantity_times_price() {
        let item = OrderItem::new(OrderId::new(), ProductId::new(), dec!(1.5), dec!(4));
        assert_eq!(item.subtotal(), dec!(6.0));
    }
}
