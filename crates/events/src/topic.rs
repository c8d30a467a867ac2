use core::fmt;

use serde_json::Value;

/// Named fan-out group a connection can belong to.
///
/// Rendered as `orders`, `order_<id>` and `payment_<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// Every connection joins this on connect and leaves it on its first
    /// order or payment subscription.
    Orders,
    Order(String),
    Payment(String),
}

impl Topic {
    pub fn order(id: impl fmt::Display) -> Self {
        Topic::Order(id.to_string())
    }

    pub fn payment(id: impl fmt::Display) -> Self {
        Topic::Payment(id.to_string())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Orders => f.write_str("orders"),
            Topic::Order(id) => write!(f, "order_{id}"),
            Topic::Payment(id) => write!(f, "payment_{id}"),
        }
    }
}

/// Integral floats below 2^53 convert to integers without loss.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Normalize a JSON id (`42`, `42.0` or `"42"`) to its topic key.
///
/// Empty strings, `0`, `null` and non-scalar values are not ids.
pub(crate) fn topic_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let key = match (n.as_i64(), n.as_f64()) {
                (Some(int), _) => int.to_string(),
                (None, Some(float)) if float.fract() == 0.0 && float.abs() < MAX_EXACT_FLOAT => {
                    (float as i64).to_string()
                }
                _ => n.to_string(),
            };
            (key != "0").then_some(key)
        }
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
