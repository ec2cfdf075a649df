// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Chaves conhecidas. O valor é JSON livre; quem lê decide o formato e o fallback.
pub const ORDER_DEFAULT_STATUS_KEY: &str = "order.defaultStatusKey";
pub const APPOINTMENT_DEFAULT_DURATION: &str = "appointment.defaultDurationMinutes";
pub const APPOINTMENT_AUTO_CONFIRM: &str = "appointment.autoConfirm";
pub const APPOINTMENT_ALLOW_STAFF_CREATE: &str = "appointment.allowStaffCreate";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[schema(ignore)]
    pub id: i64,
    #[schema(ignore)]
    pub business_id: i64,

    #[schema(example = "appointment.defaultDurationMinutes")]
    pub key: String,

    #[schema(value_type = Object, example = 45)]
    pub value: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertSettingPayload {
    #[validate(length(min = 1, max = 128, message = "A chave é obrigatória."))]
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetSettingValuePayload {
    #[schema(value_type = Object)]
    pub value: Value,
}
