// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::catalog::{Product, ProductQuery, ProductType},
};

/// Todos os campos graváveis de um produto, já validados e resolvidos.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub category_id: Option<i64>,
    pub name: String,
    pub subtitle: Option<String>,
    pub sku: Option<String>,
    pub product_type: ProductType,
    pub price_cents: i64,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub stock: Option<i32>,
    pub tags: Vec<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_active: bool,
}

impl ProductFields {
    pub fn from_product(p: &Product) -> Self {
        Self {
            category_id: p.category_id,
            name: p.name.clone(),
            subtitle: p.subtitle.clone(),
            sku: p.sku.clone(),
            product_type: p.product_type,
            price_cents: p.price_cents,
            description: p.description.clone(),
            features: p.features.clone(),
            image_url: p.image_url.clone(),
            images: p.images.clone(),
            stock: p.stock,
            tags: p.tags.clone(),
            seo_title: p.seo_title.clone(),
            seo_description: p.seo_description.clone(),
            is_active: p.is_active,
        }
    }
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        business_id: i64,
        only_active: bool,
        filter: &ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE business_id = ");
        qb.push_bind(business_id);

        if only_active {
            qb.push(" AND is_active");
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR sku ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY name ASC");

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok(products)
    }

    pub async fn find_in_business<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Trava a linha até o fim da transação do update.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND business_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Produtos ativos da loja entre os ids pedidos (os ausentes simplesmente não voltam).
    pub async fn find_active_by_ids<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE business_id = $1 AND is_active AND id = ANY($2)",
        )
        .bind(business_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn count_active_in_category<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        category_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE business_id = $1 AND category_id = $2 AND is_active",
        )
        .bind(business_id)
        .bind(category_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn create(&self, business_id: i64, fields: &ProductFields) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                business_id, category_id, name, subtitle, sku, product_type, price_cents,
                description, features, image_url, images, stock, tags,
                seo_title, seo_description, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(fields.category_id)
        .bind(&fields.name)
        .bind(&fields.subtitle)
        .bind(&fields.sku)
        .bind(fields.product_type)
        .bind(fields.price_cents)
        .bind(&fields.description)
        .bind(&fields.features)
        .bind(&fields.image_url)
        .bind(&fields.images)
        .bind(fields.stock)
        .bind(&fields.tags)
        .bind(&fields.seo_title)
        .bind(&fields.seo_description)
        .bind(fields.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
        fields: &ProductFields,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                category_id = $3,
                name = $4,
                subtitle = $5,
                sku = $6,
                product_type = $7,
                price_cents = $8,
                description = $9,
                features = $10,
                image_url = $11,
                images = $12,
                stock = $13,
                tags = $14,
                seo_title = $15,
                seo_description = $16,
                is_active = $17,
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(fields.category_id)
        .bind(&fields.name)
        .bind(&fields.subtitle)
        .bind(&fields.sku)
        .bind(fields.product_type)
        .bind(fields.price_cents)
        .bind(&fields.description)
        .bind(&fields.features)
        .bind(&fields.image_url)
        .bind(&fields.images)
        .bind(fields.stock)
        .bind(&fields.tags)
        .bind(&fields.seo_title)
        .bind(&fields.seo_description)
        .bind(fields.is_active)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Arquivar é sempre soft: itens de pedidos antigos continuam apontando para cá.
    pub async fn archive(&self, business_id: i64, id: i64) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }
}
