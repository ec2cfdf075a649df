use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::settings::Setting};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<Setting>, AppError> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT * FROM settings WHERE business_id = $1 ORDER BY key ASC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        key: &str,
    ) -> Result<Option<Setting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT * FROM settings WHERE business_id = $1 AND key = $2",
        )
        .bind(business_id)
        .bind(key)
        .fetch_optional(executor)
        .await?;
        Ok(setting)
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        key: &str,
        value: &Value,
    ) -> Result<Setting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update) pela chave única (business_id, key)
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (business_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (business_id, key)
            DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(key)
        .bind(value)
        .fetch_one(executor)
        .await?;
        Ok(setting)
    }
}
