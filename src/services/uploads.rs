// src/services/uploads.rs

use std::path::PathBuf;

use image::ImageFormat;
use uuid::Uuid;

use crate::{common::error::AppError, models::uploads::UploadResponse};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const PRODUCT_IMAGES_DIR: &str = "products";

/// Confere o tipo declarado E o conteúdo real. Devolve a extensão a gravar.
pub fn validate_image_upload(content_type: Option<&str>, bytes: &[u8]) -> Result<&'static str, AppError> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Arquivo vazio.".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(format!(
            "Arquivo muito grande: {} bytes (máximo {}).",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let declared = match content_type.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
        Some("image/jpeg") | Some("image/jpg") => ImageFormat::Jpeg,
        Some("image/png") => ImageFormat::Png,
        Some("image/webp") => ImageFormat::WebP,
        _ => {
            return Err(AppError::BadRequest(
                "Formato não suportado. Envie JPEG, PNG ou WEBP.".into(),
            ))
        }
    };

    let actual = image::guess_format(bytes)
        .map_err(|_| AppError::BadRequest("O conteúdo do arquivo não é uma imagem válida.".into()))?;

    if actual != declared {
        return Err(AppError::BadRequest(
            "O conteúdo do arquivo não corresponde ao tipo informado.".into(),
        ));
    }

    Ok(match actual {
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        _ => "jpg",
    })
}

/// Imagens de produto em disco, servidas estaticamente em `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadService {
    root: PathBuf,
    public_base_url: String,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self { root: root.into(), public_base_url: public_base_url.into() }
    }

    pub async fn store_product_image(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, AppError> {
        let ext = validate_image_upload(content_type, bytes)?;
        let filename = format!("{}.{}", Uuid::new_v4(), ext);

        let dir = self.root.join(PRODUCT_IMAGES_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar {:?}: {}", dir, e))?;

        let path = dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar {:?}: {}", path, e))?;

        tracing::info!(file = %filename, size = bytes.len(), "🖼️ Imagem de produto enviada");

        Ok(UploadResponse {
            url: self.public_url(&filename),
            filename,
            size: bytes.len(),
            content_type: mime_for(ext).to_string(),
        })
    }

    fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/uploads/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            PRODUCT_IMAGES_DIR,
            filename
        )
    }
}

fn mime_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn accepts_matching_type_and_content() {
        assert_eq!(validate_image_upload(Some("image/png"), PNG).unwrap(), "png");
        assert_eq!(validate_image_upload(Some("image/jpeg"), JPEG).unwrap(), "jpg");
    }

    #[test]
    fn rejects_mismatched_content() {
        assert!(matches!(
            validate_image_upload(Some("image/jpeg"), PNG),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_image_upload(Some("image/png"), b"not an image at all").is_err());
    }

    #[test]
    fn rejects_unsupported_type_and_empty_file() {
        assert!(validate_image_upload(Some("image/gif"), b"GIF89a").is_err());
        assert!(validate_image_upload(None, PNG).is_err());
        assert!(validate_image_upload(Some("image/png"), &[]).is_err());
    }

    #[test]
    fn rejects_files_over_the_limit() {
        let mut big = PNG.to_vec();
        big.resize(MAX_UPLOAD_BYTES + 1, 0);
        assert!(validate_image_upload(Some("image/png"), &big).is_err());
    }

    #[tokio::test]
    async fn stores_file_and_builds_public_url() {
        let root = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let service = UploadService::new(&root, "http://localhost:4000/");

        let stored = service.store_product_image(Some("image/png"), PNG).await.unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.size, PNG.len());
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(
            stored.url,
            format!("http://localhost:4000/uploads/products/{}", stored.filename)
        );
        assert!(root.join("products").join(&stored.filename).exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
