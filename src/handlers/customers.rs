// src/handlers/customers.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AnyRole, RequireRole},
    models::{
        auth::OkResponse,
        customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
    },
};

// O recorte por papel (ADMIN tudo, STAFF os seus, CUSTOMER pelo telefone)
// fica no serviço; aqui só exigimos um papel conhecido.

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses((status = 200, description = "Clientes visíveis para o papel", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list(&session).await?;
    Ok(ApiResponse::ok(customers))
}

#[utoipa::path(
    get,
    path = "/api/customers/me",
    tag = "Customers",
    responses((status = 200, description = "Fichas com o telefone da sessão", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn my_customers(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.me(&session).await?;
    Ok(ApiResponse::ok(customers))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 403, description = "Cliente de outro atendente"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.get(&session, id).await?;
    Ok(ApiResponse::ok(customer))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 403, description = "CUSTOMER não cria clientes")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ValidatedJson(payload): ValidatedJson<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(customer)))
}

#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 403, description = "Sem permissão sobre este cliente"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.update(&session, id, payload).await?;
    Ok(ApiResponse::ok(customer))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente removido", body = OkResponse),
        (status = 403, description = "Sem permissão sobre este cliente"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.delete(&session, id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}
