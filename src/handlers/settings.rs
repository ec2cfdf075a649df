// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, AdminOrStaff, RequireRole},
    models::settings::{SetSettingValuePayload, Setting, UpsertSettingPayload},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Todas as chaves da loja", body = Vec<Setting>)),
    security(("api_jwt" = []))
)]
pub async fn list_settings(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOrStaff>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.list(session.business_id).await?;
    Ok(ApiResponse::ok(settings))
}

// GET /api/settings/{key}: chave ausente responde `data: null`
#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Chave, ex.: order.defaultStatusKey")),
    responses((status = 200, description = "Valor salvo ou null", body = Setting)),
    security(("api_jwt" = []))
)]
pub async fn get_setting(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOrStaff>,
    ApiPath(key): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state.settings_service.get(session.business_id, &key).await?;
    Ok(ApiResponse::ok(setting))
}

// POST /api/settings
#[utoipa::path(
    post,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpsertSettingPayload,
    responses((status = 200, description = "Valor gravado", body = Setting)),
    security(("api_jwt" = []))
)]
pub async fn upsert_setting(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ValidatedJson(payload): ValidatedJson<UpsertSettingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state
        .settings_service
        .set(session.business_id, &payload.key, &payload.value)
        .await?;
    Ok(ApiResponse::ok(setting))
}

// POST /api/settings/{key}
#[utoipa::path(
    post,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Chave a gravar")),
    request_body = SetSettingValuePayload,
    responses((status = 200, description = "Valor gravado", body = Setting)),
    security(("api_jwt" = []))
)]
pub async fn set_setting(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    ApiPath(key): ApiPath<String>,
    ValidatedJson(payload): ValidatedJson<SetSettingValuePayload>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state
        .settings_service
        .set(session.business_id, &key, &payload.value)
        .await?;
    Ok(ApiResponse::ok(setting))
}
