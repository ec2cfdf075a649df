// src/handlers/orders.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiQuery, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AnyRole, RequireRole},
    models::order::{
        CreateOrderPayload, CreatePaymentPayload, Order, OrderDetail, OrderQuery, Payment,
        UpdateOrderPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(
        ("statusKey" = Option<String>, Query, description = "Filtra pela chave do status"),
        ("customerId" = Option<i64>, Query, description = "Filtra pelo cliente")
    ),
    responses((status = 200, description = "Pedidos visíveis para o papel", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list(&session, &query).await?;
    Ok(ApiResponse::ok(orders))
}

/// Cria o pedido com os preços congelados no momento da compra.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = OrderDetail),
        (status = 403, description = "CUSTOMER não cria pedidos"),
        (status = 404, description = "Cliente, status padrão ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ValidatedJson(payload): ValidatedJson<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens, pagamentos e status", body = OrderDetail),
        (status = 403, description = "Pedido de outro atendente"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.detail(&session, id).await?;
    Ok(ApiResponse::ok(order))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "ID do pedido")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = OrderDetail),
        (status = 403, description = "Sem permissão sobre este pedido"),
        (status = 404, description = "Pedido ou status não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.update(&session, id, payload).await?;
    Ok(ApiResponse::ok(order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payments",
    tag = "Payments",
    params(("id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pagamentos do pedido", body = Vec<Payment>),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.order_service.list_payments(&session, id).await?;
    Ok(ApiResponse::ok(payments))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/payments",
    tag = "Payments",
    params(("id" = i64, Path, description = "ID do pedido")),
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_payment(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<CreatePaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.order_service.add_payment(&session, id, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(payment)))
}
