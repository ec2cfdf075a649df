// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "product_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    Physical,
    Service,
    Weight,
    Custom,
}

// --- CATEGORIAS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    #[schema(example = "sicak-icecekler")]
    pub slug: String,
    pub is_active: bool,
    pub order_index: i32,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Sıcak İçecekler")]
    pub name: String,
    pub slug: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub order_index: Option<i32>,
    pub is_active: Option<bool>,
}

// Categoria pública com seus produtos ativos
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

// --- PRODUTOS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub business_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub subtitle: Option<String>,
    pub sku: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    // Sempre em centavos (menor unidade da moeda)
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub subtitle: Option<String>,
    pub sku: Option<String>,
    #[serde(rename = "type", default = "default_product_type")]
    pub product_type: ProductType,
    // String de propósito: "1050" = 10,50
    #[schema(example = "1050")]
    pub price_cents: String,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub category_id: Option<i64>,
    pub is_active: Option<bool>,
}

fn default_product_type() -> ProductType {
    ProductType::Physical
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub sku: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
    #[schema(example = "500")]
    pub price_cents: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub stock: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub category_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Filtros da listagem de produtos
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<i64>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    #[serde(default)]
    pub include_archived: bool,
}
