use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::customer::{Customer, ShippingAddress};
use super::status::{status_label, OrderStatus};

/// Monetary amount in the shop currency's native precision.
pub type Money = Decimal;

/// How the customer pays for an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    /// Online payment gateway (VNPay).
    Online,
    Other(String),
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "cash" => PaymentMethod::Cash,
            "vnpay" => PaymentMethod::Online,
            _ => PaymentMethod::Other(raw),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => "cash".to_string(),
            PaymentMethod::Online => "vnpay".to_string(),
            PaymentMethod::Other(raw) => raw,
        }
    }
}

impl PaymentMethod {
    /// Short tag used in the order list.
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "ONLINE",
            _ => "COD",
        }
    }

    /// Long description used in the order detail.
    pub fn describe(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Cash on delivery (COD)",
            PaymentMethod::Online => "VNPay",
            PaymentMethod::Other(raw) => raw,
        }
    }
}

/// Product populated into a line item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One product entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "product_id", default, deserialize_with = "populated")]
    pub product: Option<ProductRef>,
}

impl LineItem {
    pub fn new(price: Money, quantity: u32) -> Self {
        Self {
            price,
            quantity,
            size: None,
            color: None,
            name: None,
            product: None,
        }
    }

    /// `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price * Money::from(self.quantity)
    }

    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|product| product.name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("Unnamed product")
    }
}

/// An order as served by the remote order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_code: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub shipping_fee: Option<Money>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    /// Stored total kept by the service. It can be stale and is never displayed;
    /// use [`order_total`].
    #[serde(rename = "total_amount", default, skip_serializing_if = "Option::is_none")]
    pub stored_total: Option<Money>,
    #[serde(rename = "user_id", default, deserialize_with = "populated")]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub address: Option<ShippingAddress>,
}

impl Order {
    pub fn new(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            order_code: None,
            created_at: None,
            status: status.as_str().to_string(),
            payment_method: PaymentMethod::default(),
            shipping_fee: None,
            items: None,
            stored_total: None,
            customer: None,
            address: None,
        }
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_shipping_fee(mut self, fee: Money) -> Self {
        self.shipping_fee = Some(fee);
        self
    }

    /// Line items; a missing list reads as empty.
    pub fn items(&self) -> &[LineItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee.unwrap_or_default()
    }

    /// Sum of line totals, without shipping.
    pub fn subtotal(&self) -> Money {
        self.items().iter().map(LineItem::line_total).sum()
    }

    pub fn total(&self) -> Money {
        order_total(self)
    }

    /// Current status, if it belongs to the vocabulary.
    pub fn known_status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }

    pub fn status_label(&self) -> &'static str {
        status_label(&self.status)
    }

    /// `order_code`, or `#` followed by the last six characters of the id.
    pub fn display_code(&self) -> String {
        if let Some(code) = self.order_code.as_deref().filter(|c| !c.is_empty()) {
            return code.to_string();
        }
        let chars: Vec<char> = self.id.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
        format!("#{}", tail.to_uppercase())
    }

    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .and_then(|customer| customer.full_name.as_deref())
            .unwrap_or("Anonymous")
    }
}

/// Authoritative order total: line items plus shipping fee.
///
/// Every displayed total goes through here; `stored_total` is never consulted.
pub fn order_total(order: &Order) -> Money {
    order.subtotal() + order.shipping_fee()
}

/// Accepts a populated sub-document and maps a bare reference id (or null) to `None`.
/// Treats an explicit `null` like a missing key.
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn populated<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
