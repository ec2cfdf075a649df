// src/models/uploads.rs

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "http://localhost:4000/uploads/products/3f1c.webp")]
    pub url: String,
    pub filename: String,
    pub size: usize,
    pub content_type: String,
}

/// Formulário multipart do upload (só documentação).
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProductImageForm {
    /// jpeg, png ou webp, até 5 MB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
