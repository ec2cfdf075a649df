use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// Taxonomia única de erros da aplicação. Todo erro de domínio sobe até aqui
// e vira o envelope `{ success: false, message, errors }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Um ou mais campos são inválidos.")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    // Recurso inexistente OU de outra loja: a mensagem é a mesma de propósito.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{} não encontrado(a).", entity))
    }

    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Credenciais inválidas.".into())
    }

    pub fn invalid_token() -> Self {
        AppError::Unauthorized("Token de autenticação inválido ou ausente.".into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("Você não tem permissão para acessar este recurso.".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converte violação de chave única em `BadRequest`; o resto segue como erro de banco.
pub fn map_unique_violation(e: sqlx::Error, message: impl Into<String>) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::BadRequest(message.into());
        }
    }
    e.into()
}

#[derive(Debug, Serialize)]
struct FieldErrors {
    field: String,
    messages: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, errors) = match &self {
            AppError::ValidationError(errors) => {
                let mut details: Vec<FieldErrors> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, field_errors)| FieldErrors {
                        field: field.to_string(),
                        messages: field_errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect(),
                    })
                    .collect();
                details.sort_by(|a, b| a.field.cmp(&b.field));
                (self.to_string(), details)
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => (msg.clone(), Vec::new()),
            AppError::JwtError(_) => (AppError::invalid_token().to_string(), Vec::new()),

            // Banco, bcrypt e afins: loga a causa completa, devolve mensagem genérica.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ("Ocorreu um erro inesperado.".to_string(), Vec::new())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "errors": errors,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_uses_error_envelope() {
        let response = AppError::not_found("Pedido").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Pedido não encontrado(a).");
        assert_eq!(body["errors"], json!([]));
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let response =
            AppError::InternalServerError(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Ocorreu um erro inesperado.");
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "curto demais"))]
        name: String,
    }

    #[tokio::test]
    async fn validation_errors_are_listed_per_field() {
        let errors = Payload { name: "a".into() }.validate().unwrap_err();
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["messages"][0], "curto demais");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::invalid_credentials().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }
}
