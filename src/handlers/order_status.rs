// src/handlers/order_status.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, AnyRole, RequireRole},
    models::{
        auth::OkResponse,
        order::{CreateOrderStatusPayload, OrderStatus, UpdateOrderStatusPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/order-status",
    tag = "OrderStatus",
    responses((status = 200, description = "Status da loja, em ordem", body = Vec<OrderStatus>)),
    security(("api_jwt" = []))
)]
pub async fn list_statuses(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
) -> Result<impl IntoResponse, AppError> {
    let statuses = app_state.order_status_service.list(session.business_id).await?;
    Ok(ApiResponse::ok(statuses))
}

#[utoipa::path(
    get,
    path = "/api/order-status/{id}",
    tag = "OrderStatus",
    params(("id" = i64, Path, description = "ID do status")),
    responses(
        (status = 200, description = "Status", body = OrderStatus),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_status(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.order_status_service.get(session.business_id, id).await?;
    Ok(ApiResponse::ok(status))
}

#[utoipa::path(
    post,
    path = "/api/order-status",
    tag = "OrderStatus",
    request_body = CreateOrderStatusPayload,
    responses(
        (status = 201, description = "Status criado", body = OrderStatus),
        (status = 400, description = "Chave já usada na loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_status(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ValidatedJson(payload): ValidatedJson<CreateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state
        .order_status_service
        .create(session.business_id, payload)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(status)))
}

#[utoipa::path(
    patch,
    path = "/api/order-status/{id}",
    tag = "OrderStatus",
    params(("id" = i64, Path, description = "ID do status")),
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = OrderStatus),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state
        .order_status_service
        .update(session.business_id, id, payload)
        .await?;
    Ok(ApiResponse::ok(status))
}

#[utoipa::path(
    delete,
    path = "/api/order-status/{id}",
    tag = "OrderStatus",
    params(("id" = i64, Path, description = "ID do status")),
    responses(
        (status = 200, description = "Status removido", body = OkResponse),
        (status = 400, description = "Ainda há pedidos com este status"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_status(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.order_status_service.delete(session.business_id, id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}
