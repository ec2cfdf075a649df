// src/services/settings_service.rs

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::{common::error::AppError, db::SettingsRepository, models::settings::Setting};

/// Chave→JSON por loja. Sem esquema: quem lê interpreta o formato e escolhe o fallback.
#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    pool: PgPool,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<Setting>, AppError> {
        self.repo.list(business_id).await
    }

    pub async fn get(&self, business_id: i64, key: &str) -> Result<Option<Setting>, AppError> {
        self.repo.get(&self.pool, business_id, key).await
    }

    pub async fn set(&self, business_id: i64, key: &str, value: &Value) -> Result<Setting, AppError> {
        let setting = self.repo.upsert(&self.pool, business_id, key, value).await?;
        tracing::info!(business_id, key, "⚙️ Configuração atualizada");
        Ok(setting)
    }

    /// Valor tipado. Formato inesperado é tratado como ausente (o chamador cai no fallback).
    pub async fn get_json<T: DeserializeOwned>(&self, business_id: i64, key: &str) -> Result<Option<T>, AppError> {
        let Some(setting) = self.get(business_id, key).await? else {
            return Ok(None);
        };

        match serde_json::from_value::<T>(setting.value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(business_id, key, "Configuração com formato inesperado: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, business_id: i64, key: &str, value: &T) -> Result<Setting, AppError> {
        let json = serde_json::to_value(value).map_err(|e| anyhow::anyhow!(e))?;
        self.set(business_id, key, &json).await
    }

    /// Valor cru, para chaves que aceitam mais de uma representação (ex: `45` ou `"45"`).
    pub async fn get_value(&self, business_id: i64, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.get(business_id, key).await?.map(|s| s.value))
    }
}

/// Inteiro vindo de JSON livre: número ou string numérica.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Booleano vindo de JSON livre: `true`/`false` ou as strings equivalentes.
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_accept_numbers_and_numeric_strings() {
        assert_eq!(value_as_i64(&json!(45)), Some(45));
        assert_eq!(value_as_i64(&json!(" 30 ")), Some(30));
        assert_eq!(value_as_i64(&json!("meia hora")), None);
        assert_eq!(value_as_i64(&json!(null)), None);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(value_as_bool(&json!(true)), Some(true));
        assert_eq!(value_as_bool(&json!("TRUE")), Some(true));
        assert_eq!(value_as_bool(&json!("0")), Some(false));
        assert_eq!(value_as_bool(&json!(1)), Some(true));
        assert_eq!(value_as_bool(&json!({"on": true})), None);
    }
}
