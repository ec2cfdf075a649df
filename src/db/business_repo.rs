// src/db/business_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::business::Business};

#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Business>, AppError> {
        let business = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(business)
    }

    /// A loja de menor id: fallback da vitrine pública quando nada foi configurado.
    pub async fn find_first(&self) -> Result<Option<Business>, AppError> {
        let business =
            sqlx::query_as::<_, Business>("SELECT * FROM businesses ORDER BY id ASC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(business)
    }
}
