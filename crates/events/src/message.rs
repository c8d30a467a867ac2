//! Wire messages of the order update relay.
//!
//! Outbound frames are the JSON encoding of [`OrderEvent`]; inbound frames
//! are parsed as [`ClientMessage`] and anything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::topic::{Topic, topic_key};

/// What happened to the entity carried by an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

/// Change notification for an order, one of its items or a payment.
///
/// The entity body is opaque to the relay; only its ids are read, to pick
/// the groups the event fans out to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    OrderUpdate { action: Action, order: Value },
    OrderItemUpdate { action: Action, order_item: Value },
    PaymentUpdate { action: Action, payment: Value },
}

impl OrderEvent {
    pub fn order(action: Action, order: Value) -> Self {
        OrderEvent::OrderUpdate { action, order }
    }

    pub fn order_item(action: Action, order_item: Value) -> Self {
        OrderEvent::OrderItemUpdate { action, order_item }
    }

    pub fn payment(action: Action, payment: Value) -> Self {
        OrderEvent::PaymentUpdate { action, payment }
    }

    pub fn action(&self) -> Action {
        match self {
            OrderEvent::OrderUpdate { action, .. }
            | OrderEvent::OrderItemUpdate { action, .. }
            | OrderEvent::PaymentUpdate { action, .. } => *action,
        }
    }

    /// The `type` tag of the outbound frame.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderEvent::OrderUpdate { .. } => "order_update",
            OrderEvent::OrderItemUpdate { .. } => "order_item_update",
            OrderEvent::PaymentUpdate { .. } => "payment_update",
        }
    }

    /// Id of the order this event concerns, if the body carries one.
    pub fn order_key(&self) -> Option<String> {
        match self {
            OrderEvent::OrderUpdate { order, .. } => order.get("id").and_then(topic_key),
            OrderEvent::OrderItemUpdate { order_item: body, .. }
            | OrderEvent::PaymentUpdate { payment: body, .. } => parent_order_key(body),
        }
    }

    /// Groups this event is delivered to: always `orders`, then the order's
    /// own group and, for payments, the payment's group.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics = vec![Topic::Orders];
        if let Some(order) = self.order_key() {
            topics.push(Topic::Order(order));
        }
        let payment_key = match self {
            OrderEvent::PaymentUpdate { payment, .. } => payment.get("id").and_then(topic_key),
            _ => None,
        };
        if let Some(id) = payment_key {
            topics.push(Topic::Payment(id));
        }
        topics
    }
}

/// Order reference on an item or payment body: `order` (id or nested
/// object) or `order_id`.
fn parent_order_key(body: &Value) -> Option<String> {
    match body.get("order") {
        Some(Value::Object(nested)) => nested.get("id").and_then(topic_key),
        Some(other) => topic_key(other),
        None => body.get("order_id").and_then(topic_key),
    }
}

/// Message sent by a display client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        #[serde(default)]
        order_id: Value,
    },
}

impl ClientMessage {
    /// Parse a text frame. Malformed or unknown frames yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Group the client asks to join, if the request names a usable id.
    pub fn topic(&self) -> Option<Topic> {
        match self {
            ClientMessage::Subscribe { order_id } => topic_key(order_id).map(Topic::Order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outbound_frame_shape() {
        let event = OrderEvent::order(Action::Created, json!({"id": 42, "status": "pending"}));
        let frame = serde_json::to_value(&event).unwrap();

        assert_eq!(
            frame,
            json!({"type": "order_update", "action": "created", "order": {"id": 42, "status": "pending"}})
        );
        assert_eq!(event.kind(), "order_update");
    }

    #[test]
    fn order_events_target_orders_and_their_own_group() {
        let event = OrderEvent::order(Action::Updated, json!({"id": 42}));
        assert_eq!(event.topics(), vec![Topic::Orders, Topic::order(42)]);
    }

    #[test]
    fn item_events_route_by_parent_order() {
        let by_id = OrderEvent::order_item(Action::Deleted, json!({"id": 7, "order": 42}));
        let nested = OrderEvent::order_item(Action::Updated, json!({"id": 7, "order": {"id": "42"}}));
        let by_field = OrderEvent::order_item(Action::Created, json!({"id": 7, "order_id": 42}));

        for event in [by_id, nested, by_field] {
            assert_eq!(event.topics(), vec![Topic::Orders, Topic::order(42)]);
        }
    }

    #[test]
    fn payment_events_also_target_the_payment_group() {
        let event = OrderEvent::payment(Action::Created, json!({"id": 9, "order": 42, "amount": "12.50"}));
        assert_eq!(
            event.topics(),
            vec![Topic::Orders, Topic::order(42), Topic::payment(9)]
        );
    }

    #[test]
    fn events_without_ids_only_reach_the_shared_group() {
        let event = OrderEvent::order(Action::Updated, json!({"status": "ready"}));
        assert_eq!(event.topics(), vec![Topic::Orders]);
    }

    #[test]
    fn subscribe_accepts_numeric_and_string_ids() {
        let numeric = ClientMessage::parse(r#"{"type":"subscribe","order_id":42}"#).unwrap();
        let text = ClientMessage::parse(r#"{"type":"subscribe","order_id":"42"}"#).unwrap();

        assert_eq!(numeric.topic(), Some(Topic::order(42)));
        assert_eq!(text.topic(), Some(Topic::order(42)));
    }

    #[test]
    fn other_client_frames_are_ignored() {
        assert_eq!(ClientMessage::parse("not json"), None);
        assert_eq!(ClientMessage::parse(r#"{"type":"ping"}"#), None);
        assert_eq!(
            ClientMessage::parse(r#"{"type":"subscribe"}"#).and_then(|m| m.topic()),
            None
        );
    }
}
