// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::money::deserialize_quantity;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "order_source", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSource {
    Pos,
    Online,
    Phone,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

// --- STATUS (definidos por loja, não um enum fixo) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub id: i64,
    pub business_id: i64,
    #[schema(example = "CREATED")]
    pub key: String,
    pub label: String,
    pub order_index: i32,
    pub is_final: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Chave e rótulo são gravados com trim: só espaços equivale a vazio
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderStatusPayload {
    #[validate(length(min = 1, max = 64, message = "A chave é obrigatória."))]
    #[validate(custom(function = "not_blank"))]
    pub key: String,
    #[validate(length(min = 1, message = "O rótulo é obrigatório."))]
    #[validate(custom(function = "not_blank"))]
    pub label: String,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusPayload {
    #[validate(length(min = 1, max = 64, message = "A chave é obrigatória."))]
    #[validate(custom(function = "not_blank"))]
    pub key: Option<String>,
    #[validate(length(min = 1, message = "O rótulo é obrigatório."))]
    #[validate(custom(function = "not_blank"))]
    pub label: Option<String>,
    pub order_index: Option<i32>,
    pub is_final: Option<bool>,
    pub is_default: Option<bool>,
}

// --- PEDIDOS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub business_id: i64,
    pub customer_id: i64,
    pub created_by_user_id: i64,
    pub status_id: i64,
    // Congelado na criação; nunca recalculado a partir do preço atual
    pub total_amount_cents: i64,
    pub source: OrderSource,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub business_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub business_id: i64,
    pub order_id: i64,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Pedido completo: itens, pagamentos e status atual
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub product_id: i64,
    #[serde(deserialize_with = "deserialize_quantity")]
    #[schema(value_type = String, example = "2")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: i64,
    #[serde(default)]
    pub items: Vec<OrderLinePayload>,
    pub source: Option<OrderSource>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    pub status_key: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub status_key: Option<String>,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    #[schema(example = "2000")]
    pub amount_cents: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whitespace_only_status_key_or_label_is_rejected() {
        let create: CreateOrderStatusPayload =
            serde_json::from_value(json!({ "key": "   ", "label": "Novo" })).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("key"));

        let create: CreateOrderStatusPayload =
            serde_json::from_value(json!({ "key": "NEW", "label": " \t " })).unwrap();
        assert!(create.validate().unwrap_err().field_errors().contains_key("label"));

        let update: UpdateOrderStatusPayload = serde_json::from_value(json!({ "label": "  " })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn padded_status_key_still_validates() {
        let create: CreateOrderStatusPayload =
            serde_json::from_value(json!({ "key": " NEW ", "label": "Novo" })).unwrap();
        assert!(create.validate().is_ok());

        let update: UpdateOrderStatusPayload = serde_json::from_value(json!({ "isDefault": true })).unwrap();
        assert!(update.validate().is_ok());
    }
}
