use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::ports::{Document, StoredDocument};
use super::principal::Principal;
use super::requests::json_object;

pub const COLLECTION: &str = "pedidos";
pub const INITIAL_STATUS: &str = "PENDENTE";
pub const UNKNOWN_STATUS: &str = "DESCONHECIDO";

const REQUIRED_FIELDS: [&str; 3] = ["cliente", "email", "itens"];

/// Current UTC time as ISO-8601 with a `Z` designator.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Body of `POST /pedidos`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(rename = "cliente")]
    pub customer_name: String,
    #[serde(rename = "email")]
    pub customer_email: String,
    /// Line items, each with a numeric `quantidade` and `preco`.
    #[serde(rename = "itens")]
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItem {
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn from_value(index: usize, value: &Value) -> Result<Self, DomainError> {
        let fields = value
            .as_object()
            .ok_or_else(|| invalid_item(index, "must be an object"))?;
        Ok(Self {
            quantity: number_field(index, fields, "quantidade")?,
            unit_price: number_field(index, fields, "preco")?,
        })
    }

    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

fn number_field(index: usize, fields: &Map<String, Value>, name: &str) -> Result<f64, DomainError> {
    let value = fields
        .get(name)
        .ok_or_else(|| invalid_item(index, &format!("missing '{name}'")))?;
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(n),
        Some(_) => Err(invalid_item(index, &format!("'{name}' must not be negative"))),
        None => Err(invalid_item(index, &format!("'{name}' must be a number"))),
    }
}

fn invalid_item(index: usize, detail: &str) -> DomainError {
    DomainError::InvalidItem(format!("invalid order item at index {index}: {detail}"))
}

/// Each subtotal and every running sum must stay finite, so the stored total
/// is always a JSON number.
fn ensure_finite_total(lines: &[LineItem]) -> Result<(), DomainError> {
    let mut total = 0.0;
    for (index, line) in lines.iter().enumerate() {
        let subtotal = line.subtotal();
        if !subtotal.is_finite() {
            return Err(invalid_item(index, "quantity times price is out of range"));
        }
        total += subtotal;
        if !total.is_finite() {
            return Err(invalid_item(index, "order total is out of range"));
        }
    }
    Ok(())
}

/// A validated order submission, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    /// Items exactly as submitted; stored verbatim.
    pub items: Vec<Value>,
    pub lines: Vec<LineItem>,
}

impl NewOrder {
    pub fn parse(body: &[u8]) -> Result<Self, DomainError> {
        let fields = json_object(body)?;
        if REQUIRED_FIELDS.iter().any(|name| !fields.contains_key(*name)) {
            return Err(DomainError::MissingFields("missing required fields".to_string()));
        }

        let request: CreateOrderRequest = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::MalformedBody(format!("invalid order body: {e}")))?;

        let lines = request
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| LineItem::from_value(index, item))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_finite_total(&lines)?;

        Ok(Self {
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            items: request.items,
            lines,
        })
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(LineItem::subtotal).sum()
    }

    /// Stamps id, status, total and creation time onto the submission.
    pub fn into_order(self, owner: &Principal) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            status: INITIAL_STATUS.to_string(),
            total: self.total(),
            created_at: utc_timestamp(),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            items: self.items,
            owner_uid: owner.uid.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub status: String,
    pub total: f64,
    pub created_at: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<Value>,
    pub owner_uid: String,
}

impl From<Order> for Document {
    fn from(order: Order) -> Self {
        let mut document = Document::new();
        document.insert("id".into(), Value::from(order.id));
        document.insert("status".into(), Value::from(order.status));
        document.insert("total".into(), Value::from(order.total));
        document.insert("data_criacao".into(), Value::from(order.created_at));
        document.insert("cliente".into(), Value::from(order.customer_name));
        document.insert("email".into(), Value::from(order.customer_email));
        document.insert("itens".into(), Value::Array(order.items));
        document.insert("user_id".into(), Value::from(order.owner_uid));
        document
    }
}

/// One entry of the order listing. Absent fields fall back to neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderSummary {
    pub id: String,
    pub status: String,
    pub total: f64,
    #[serde(rename = "data_criacao")]
    pub created_at: String,
    #[serde(rename = "cliente")]
    pub customer_name: String,
    #[serde(rename = "email")]
    pub customer_email: String,
    #[serde(rename = "itens")]
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
}

impl From<StoredDocument> for OrderSummary {
    fn from(stored: StoredDocument) -> Self {
        let text = |name: &str, default: &str| {
            stored
                .data
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            status: text("status", UNKNOWN_STATUS),
            total: stored.data.get("total").and_then(Value::as_f64).unwrap_or(0.0),
            created_at: text("data_criacao", ""),
            customer_name: text("cliente", ""),
            customer_email: text("email", ""),
            items: stored
                .data
                .get("itens")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            id: stored.id,
        }
    }
}
