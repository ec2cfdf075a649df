// src/db/order_status_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::{map_unique_violation, AppError},
    models::order::OrderStatus,
};

const KEY_TAKEN: &str = "Já existe um status com esta chave.";

#[derive(Clone)]
pub struct OrderStatusRepository {
    pool: PgPool,
}

impl OrderStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<OrderStatus>, AppError> {
        let statuses = sqlx::query_as::<_, OrderStatus>(
            "SELECT * FROM order_statuses WHERE business_id = $1 ORDER BY order_index ASC, id ASC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(statuses)
    }

    pub async fn find_in_business<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
    ) -> Result<Option<OrderStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_as::<_, OrderStatus>(
            "SELECT * FROM order_statuses WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(executor)
        .await?;
        Ok(status)
    }

    pub async fn find_by_key<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        key: &str,
    ) -> Result<Option<OrderStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_as::<_, OrderStatus>(
            "SELECT * FROM order_statuses WHERE business_id = $1 AND key = $2",
        )
        .bind(business_id)
        .bind(key)
        .fetch_optional(executor)
        .await?;
        Ok(status)
    }

    /// Serializa as escritas de status padrão da loja: trava a linha do tenant
    /// até o fim da transação.
    pub async fn lock_business<'e, E>(&self, executor: E, business_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT id FROM businesses WHERE id = $1 FOR UPDATE")
            .bind(business_id)
            .fetch_optional(executor)
            .await?;
        Ok(())
    }

    /// Tira o padrão de todos os status da loja, exceto `keep_id`.
    pub async fn clear_default<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        keep_id: Option<i64>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE order_statuses SET is_default = FALSE, updated_at = NOW()
            WHERE business_id = $1 AND is_default AND ($2::BIGINT IS NULL OR id <> $2)
            "#,
        )
        .bind(business_id)
        .bind(keep_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        key: &str,
        label: &str,
        order_index: i32,
        is_final: bool,
        is_default: bool,
    ) -> Result<OrderStatus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderStatus>(
            r#"
            INSERT INTO order_statuses (business_id, key, label, order_index, is_final, is_default)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(key)
        .bind(label)
        .bind(order_index)
        .bind(is_final)
        .bind(is_default)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, KEY_TAKEN))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
        key: Option<&str>,
        label: Option<&str>,
        order_index: Option<i32>,
        is_final: Option<bool>,
        is_default: Option<bool>,
    ) -> Result<OrderStatus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderStatus>(
            r#"
            UPDATE order_statuses SET
                key = COALESCE($3, key),
                label = COALESCE($4, label),
                order_index = COALESCE($5, order_index),
                is_final = COALESCE($6, is_final),
                is_default = COALESCE($7, is_default),
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(key)
        .bind(label)
        .bind(order_index)
        .bind(is_final)
        .bind(is_default)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, KEY_TAKEN))
    }

    pub async fn delete(&self, business_id: i64, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM order_statuses WHERE id = $1 AND business_id = $2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::BadRequest(
                            "Existem pedidos com este status; ele não pode ser removido.".into(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(())
    }
}
