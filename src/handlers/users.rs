// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, AdminOrStaff, RequireRole},
    models::auth::{CreateUserPayload, UpdateUserPayload, User},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Usuários da loja", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list(&session).await?;
    Ok(ApiResponse::ok(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "E-mail ou telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ValidatedJson(payload): ValidatedJson<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(user)))
}

// STAFF só chega aqui para o próprio id (ver staff_self_guard)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 403, description = "STAFF consultando outro usuário"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOrStaff>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get_by_id(&session, id).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    get,
    path = "/api/users/by-phone/{phone}",
    tag = "Users",
    params(("phone" = String, Path, description = "Telefone do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 403, description = "STAFF consultando outro usuário"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user_by_phone(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOrStaff>,
    ApiPath(phone): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get_by_phone(&session, &phone).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.update(&session, id, payload).await?;
    Ok(ApiResponse::ok(user))
}
