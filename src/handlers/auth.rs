// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ChangePasswordPayload, ForgotPasswordPayload, LoginUserPayload, OkResponse,
        RegisterUserPayload, ResetPasswordPayload, UpdateProfilePayload, User,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let identifier = payload
        .resolved_identifier()
        .ok_or_else(|| AppError::BadRequest("Informe o telefone ou o e-mail.".into()))?;

    let access_token = app_state
        .auth_service
        .login(identifier, &payload.password)
        .await?;

    Ok(ApiResponse::ok(AuthResponse { access_token }))
}

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Cliente registrado", body = AuthResponse),
        (status = 400, description = "E-mail ou telefone já em uso"),
        (status = 404, description = "Loja não encontrada")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let access_token = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(AuthResponse { access_token })))
}

// POST /api/auth/forgot-password
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Sempre { ok: true }, exista ou não o e-mail", body = OkResponse)
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Nenhum detalhe vaza para quem chamou
    if let Err(e) = app_state.auth_service.forgot_password(&payload.email).await {
        tracing::error!("Falha no forgot-password: {:?}", e);
    }
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

// POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida", body = OkResponse),
        (status = 400, description = "Token inválido ou expirado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

// GET /api/auth/profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = User),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.profile(&session).await?;
    Ok(ApiResponse::ok(user))
}

// PATCH /api/auth/profile
#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    tag = "Auth",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "E-mail ou telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.update_profile(&session, payload).await?;
    Ok(ApiResponse::ok(user))
}

// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada", body = OkResponse),
        (status = 400, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.auth_service.change_password(&session, payload).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}
