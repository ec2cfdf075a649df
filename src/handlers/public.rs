// src/handlers/public.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiResponse},
    },
    config::AppState,
    models::catalog::{Category, CategoryWithProducts},
};

// Vitrine sem login: sempre a loja pública resolvida na subida
#[utoipa::path(
    get,
    path = "/api/public/categories",
    tag = "Public",
    responses(
        (status = 200, description = "Categorias ativas da vitrine", body = Vec<Category>),
        (status = 404, description = "Nenhuma loja pública configurada")
    )
)]
pub async fn list_categories(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .catalog_service
        .public_categories(app_state.public_business_id)
        .await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/api/public/categories/{slug}",
    tag = "Public",
    params(("slug" = String, Path, description = "Slug da categoria")),
    responses(
        (status = 200, description = "Categoria e seus produtos ativos", body = CategoryWithProducts),
        (status = 404, description = "Categoria inexistente ou arquivada")
    )
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .catalog_service
        .public_category(app_state.public_business_id, &slug)
        .await?;
    Ok(ApiResponse::ok(category))
}
