// src/db/category_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::{map_unique_violation, AppError},
    models::catalog::Category,
};

const SLUG_TAKEN: &str = "Já existe uma categoria com este slug.";

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, business_id: i64, include_archived: bool) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE business_id = $1 AND ($2 OR is_active)
            ORDER BY order_index ASC, name ASC
            "#,
        )
        .bind(business_id)
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_in_business<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn find_active_by_slug(&self, business_id: i64, slug: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE business_id = $1 AND slug = $2 AND is_active",
        )
        .bind(business_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Slug é único por loja; `except_id` ignora a própria categoria num update.
    pub async fn slug_taken(&self, business_id: i64, slug: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE business_id = $1 AND slug = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(business_id)
        .bind(slug)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(
        &self,
        business_id: i64,
        name: &str,
        slug: &str,
        order_index: i32,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (business_id, name, slug, order_index)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(name)
        .bind(slug)
        .bind(order_index)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, SLUG_TAKEN))
    }

    pub async fn update(
        &self,
        business_id: i64,
        id: i64,
        name: Option<&str>,
        slug: Option<&str>,
        order_index: Option<i32>,
        is_active: Option<bool>,
    ) -> Result<Category, AppError> {
        // Reativar limpa archived_at; desativar por aqui registra a data
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                order_index = COALESCE($5, order_index),
                is_active = COALESCE($6, is_active),
                archived_at = CASE
                    WHEN $6 IS NULL THEN archived_at
                    WHEN $6 THEN NULL
                    ELSE COALESCE(archived_at, NOW())
                END,
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(name)
        .bind(slug)
        .bind(order_index)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, SLUG_TAKEN))
    }

    pub async fn archive<'e, E>(&self, executor: E, business_id: i64, id: i64) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                is_active = FALSE,
                archived_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }
}
