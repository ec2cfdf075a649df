// src/handlers/products.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiQuery, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::catalog::{CreateProductPayload, Product, ProductQuery, UpdateProductPayload},
};

// Leitura pública: só produtos ativos da vitrine
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(
        ("categoryId" = Option<i64>, Query, description = "Filtra por categoria"),
        ("q" = Option<String>, Query, description = "Busca por nome ou SKU")
    ),
    responses((status = 200, description = "Produtos ativos", body = Vec<Product>))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_service
        .public_products(app_state.public_business_id, &query)
        .await?;
    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Não encontrado ou arquivado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_service
        .public_product(app_state.public_business_id, id)
        .await?;
    Ok(ApiResponse::ok(product))
}

// Listagem administrativa: inclui arquivados
#[utoipa::path(
    get,
    path = "/api/products/manage",
    tag = "Catalog",
    params(
        ("categoryId" = Option<i64>, Query, description = "Filtra por categoria"),
        ("q" = Option<String>, Query, description = "Busca por nome ou SKU")
    ),
    responses((status = 200, description = "Todos os produtos da loja", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_managed_products(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_service
        .list_products(session.business_id, &query)
        .await?;
    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Preço inválido ou categoria arquivada"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ValidatedJson(payload): ValidatedJson<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_service
        .create_product(session.business_id, payload)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(product)))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 400, description = "Dados inválidos ou falha na atualização"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_service
        .update_product(session.business_id, id, payload)
        .await?;
    Ok(ApiResponse::ok(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto arquivado", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_product(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_service
        .archive_product(session.business_id, id)
        .await?;
    Ok(ApiResponse::ok(product))
}
