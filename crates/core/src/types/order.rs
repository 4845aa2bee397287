use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};

/// Lifecycle state of an order, as the order service spells it on the
/// wire. States this build doesn't know pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// The wire spelling the order service expects.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::Paid => "PAGADO",
            Self::Shipped => "ENVIADO",
            Self::Delivered => "ENTREGADO",
            Self::Cancelled => "CANCELADO",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "PENDIENTE" => Self::Pending,
            "PAGADO" => Self::Paid,
            "ENVIADO" => Self::Shipped,
            "ENTREGADO" => Self::Delivered,
            "CANCELADO" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_wire().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// A placed order as shown in order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub total: Decimal,
    /// Raw timestamp string as the service sent it; formats vary across
    /// backend builds, so it is displayed verbatim.
    pub placed_at: String,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}
