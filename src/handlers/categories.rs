// src/handlers/categories.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiQuery, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, AnyRole, RequireRole},
    models::catalog::{Category, CategoryQuery, CreateCategoryPayload, UpdateCategoryPayload},
};

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    params(("includeArchived" = Option<bool>, Query, description = "Inclui categorias arquivadas")),
    responses((status = 200, description = "Categorias da loja", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .catalog_service
        .list_categories(session.business_id, query.include_archived)
        .await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Slug inválido ou já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .catalog_service
        .create_category(session.business_id, payload)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(category)))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "ID da categoria")),
    request_body = UpdateCategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 400, description = "Slug em uso ou categoria com produtos ativos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .catalog_service
        .update_category(session.business_id, id, payload)
        .await?;
    Ok(ApiResponse::ok(category))
}

// DELETE arquiva; a linha continua existindo
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria arquivada", body = Category),
        (status = 400, description = "Ainda há produtos ativos na categoria"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_category(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .catalog_service
        .archive_category(session.business_id, id)
        .await?;
    Ok(ApiResponse::ok(category))
}
