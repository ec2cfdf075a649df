// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    #[schema(example = "+905551112233")]
    pub phone: String,
    pub email: Option<String>,

    // Contas só com telefone não têm senha
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    pub role: Role,
    pub is_active: bool,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_password_token_hash: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_password_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login: telefone OU e-mail (um "@" decide qual é qual)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[schema(example = "admin@loja.com")]
    pub identifier: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

impl LoginUserPayload {
    pub fn resolved_identifier(&self) -> Option<&str> {
        [&self.identifier, &self.email, &self.phone]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

// Dados para registro de um novo cliente
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[validate(length(min = 5, message = "Telefone inválido."))]
    pub phone: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub business_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    #[validate(length(min = 5, message = "Telefone inválido."))]
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String, // ID numérico do usuário, como string
    pub phone: String,
    pub role: Role,
    pub business_id: i64,
    pub exp: usize,
    pub iat: usize,
}

/// Identidade resolvida de um token válido: quem é, em qual loja, com qual papel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub phone: String,
    pub role: Role,
    pub business_id: i64,
}

impl Session {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            phone: user.phone.clone(),
            role: user.role,
            business_id: user.business_id,
        }
    }
}

// --- Administração de usuários ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[validate(length(min = 5, message = "Telefone inválido."))]
    pub phone: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(identifier: Option<&str>, email: Option<&str>, phone: Option<&str>) -> LoginUserPayload {
        LoginUserPayload {
            identifier: identifier.map(Into::into),
            email: email.map(Into::into),
            phone: phone.map(Into::into),
            password: "secret".into(),
        }
    }

    #[test]
    fn identifier_prefers_explicit_field_then_email_then_phone() {
        assert_eq!(login(Some("x@y.com"), None, Some("555")).resolved_identifier(), Some("x@y.com"));
        assert_eq!(login(None, Some("a@b.com"), Some("555")).resolved_identifier(), Some("a@b.com"));
        assert_eq!(login(None, Some("  "), Some("555")).resolved_identifier(), Some("555"));
        assert_eq!(login(None, None, None).resolved_identifier(), None);
    }

    #[test]
    fn user_serialization_hides_secrets() {
        let now = Utc::now();
        let user = User {
            id: 1,
            business_id: 1,
            name: "Ayşe".into(),
            phone: "555".into(),
            email: None,
            password_hash: Some("$2b$hash".into()),
            role: Role::Staff,
            is_active: true,
            reset_password_token_hash: Some("abc".into()),
            reset_password_expires_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("resetPasswordTokenHash").is_none());
        assert_eq!(json["role"], "STAFF");
    }
}
