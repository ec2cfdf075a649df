// src/handlers/uploads.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::uploads::{ProductImageForm, UploadResponse},
};

const FILE_FIELD: &str = "file";

// POST /api/uploads/product-image (multipart, campo "file")
#[utoipa::path(
    post,
    path = "/api/uploads/product-image",
    tag = "Uploads",
    request_body(content = ProductImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Imagem armazenada", body = UploadResponse),
        (status = 400, description = "Arquivo ausente, grande demais ou de tipo não suportado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_product_image(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AdminOnly>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart inválido: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Falha ao ler o arquivo: {}", e.body_text())))?;

        let uploaded = app_state
            .upload_service
            .store_product_image(content_type.as_deref(), &bytes)
            .await?;

        tracing::debug!(user_id = session.user_id, url = %uploaded.url, "Upload concluído");
        return Ok((StatusCode::CREATED, ApiResponse::ok(uploaded)));
    }

    Err(AppError::BadRequest("Envie a imagem no campo 'file'.".into()))
}
