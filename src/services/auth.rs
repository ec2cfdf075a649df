// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, BusinessRepository, UserRepository},
    models::auth::{
        ChangePasswordPayload, Claims, RegisterUserPayload, Role, Session, UpdateProfilePayload, User,
    },
    services::mailer::{Mailer, OutgoingMail},
};

const RESET_TOKEN_TTL_MINUTES: i64 = 30;
const INVALID_RESET_TOKEN: &str = "Token inválido ou expirado.";

/// Parâmetros de identidade lidos do ambiente.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: i64,
    pub site_url: String,
    pub site_name: String,
    pub public_business_id: Option<i64>,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    business_repo: BusinessRepository,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        business_repo: BusinessRepository,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        Self { user_repo, business_repo, mailer, settings }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<String, AppError> {
        let identifier = identifier.trim();
        let found = if identifier.contains('@') {
            self.user_repo.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.user_repo.find_by_phone(identifier).await?
        };
        let user = found.ok_or_else(AppError::invalid_credentials)?;

        if !user.is_active {
            return Err(AppError::invalid_credentials());
        }
        let Some(password_hash) = user.password_hash.clone() else {
            return Err(AppError::invalid_credentials());
        };

        if !verify_password(password, password_hash).await? {
            return Err(AppError::invalid_credentials());
        }

        tracing::debug!(user_id = user.id, "Login efetuado");
        self.create_token(&Session::from_user(&user))
    }

    pub async fn register(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        let business_id = self.resolve_business(payload.business_id).await?;

        let name = payload.name.trim();
        let phone = payload.phone.trim();
        let email = normalize_email(payload.email.as_deref());

        let (email_taken, phone_taken) = tokio::try_join!(
            async {
                match email.as_deref() {
                    Some(e) => self.user_repo.email_exists(e).await,
                    None => Ok(false),
                }
            },
            self.user_repo.phone_exists(phone),
        )?;

        if email_taken {
            return Err(AppError::BadRequest("Este e-mail já está em uso.".into()));
        }
        if phone_taken {
            return Err(AppError::BadRequest("Este telefone já está em uso.".into()));
        }

        let password_hash = hash_password(&payload.password).await?;

        let user = self
            .user_repo
            .create_user(
                self.user_repo.pool(),
                NewUser {
                    business_id,
                    name,
                    phone,
                    email: email.as_deref(),
                    password_hash: Some(&password_hash),
                    role: Role::Customer,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, business_id, "👤 Novo cliente registrado");
        self.create_token(&Session::from_user(&user))
    }

    /// Resposta sempre igual para o chamador; falhas de envio só aparecem no log.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let Some(email) = normalize_email(Some(email)) else {
            return Ok(());
        };

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.user_repo
            .store_reset_token(user.id, &hash_reset_token(&token), expires_at)
            .await?;

        tracing::info!(user_id = user.id, "🔑 Token de redefinição de senha emitido");

        let mail = OutgoingMail {
            to: email,
            subject: format!("{} - Redefinição de senha", self.settings.site_name),
            body: format!(
                "Olá, {}!\n\nPara criar uma nova senha, acesse o link abaixo (válido por {} minutos):\n{}\n\nSe você não pediu a redefinição, ignore este e-mail.",
                user.name,
                RESET_TOKEN_TTL_MINUTES,
                reset_link(&self.settings.site_url, &token)
            ),
        };
        if let Err(e) = self.mailer.send(mail).await {
            tracing::error!(user_id = user.id, "Falha ao enviar e-mail de redefinição: {:?}", e);
        }

        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let token_hash = hash_reset_token(token.trim());

        let user = self
            .user_repo
            .find_by_valid_reset_token(&token_hash)
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_RESET_TOKEN.into()))?;

        let password_hash = hash_password(new_password).await?;

        // Duas requisições com o mesmo token: só a primeira consome.
        if !self
            .user_repo
            .consume_reset_token(user.id, &token_hash, &password_hash)
            .await?
        {
            return Err(AppError::BadRequest(INVALID_RESET_TOKEN.into()));
        }

        tracing::info!(user_id = user.id, "🔑 Senha redefinida");
        Ok(())
    }

    pub async fn change_password(&self, session: &Session, payload: ChangePasswordPayload) -> Result<(), AppError> {
        let user = self.active_user(session.user_id).await?;

        if let Some(current_hash) = user.password_hash.clone() {
            let current = payload.current_password.as_deref().unwrap_or_default();
            if current.is_empty() || !verify_password(current, current_hash).await? {
                return Err(AppError::BadRequest("Senha atual incorreta.".into()));
            }
        }

        let password_hash = hash_password(&payload.new_password).await?;
        self.user_repo.set_password_hash(user.id, &password_hash).await
    }

    pub async fn profile(&self, session: &Session) -> Result<User, AppError> {
        self.active_user(session.user_id).await
    }

    pub async fn update_profile(&self, session: &Session, payload: UpdateProfilePayload) -> Result<User, AppError> {
        let user = self.active_user(session.user_id).await?;
        let email = normalize_email(payload.email.as_deref());

        self.user_repo
            .update_profile(
                user.id,
                payload.name.as_deref().map(str::trim),
                payload.phone.as_deref().map(str::trim),
                email.as_deref(),
            )
            .await
    }

    /// Token → sessão. Usuário removido ou desativado depois da emissão perde o acesso.
    pub async fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let claims = decode_claims(&self.settings.jwt_secret, token)?;
        let user_id: i64 = claims.sub.parse().map_err(|_| AppError::invalid_token())?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(AppError::invalid_token)?;

        Ok(Session::from_user(&user))
    }

    pub fn create_token(&self, session: &Session) -> Result<String, AppError> {
        encode_claims(
            &self.settings.jwt_secret,
            session,
            Utc::now().timestamp(),
            self.settings.jwt_expires_in_seconds,
        )
    }

    async fn active_user(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(AppError::invalid_token)
    }

    // id explícito → loja pública (resolvida na subida) → primeira loja
    async fn resolve_business(&self, requested: Option<i64>) -> Result<i64, AppError> {
        if let Some(id) = requested {
            return self
                .business_repo
                .find_by_id(id)
                .await?
                .map(|b| b.id)
                .ok_or_else(|| AppError::not_found("Loja"));
        }
        if let Some(id) = self.settings.public_business_id {
            return Ok(id);
        }
        self.business_repo
            .find_first()
            .await?
            .map(|b| b.id)
            .ok_or_else(|| AppError::not_found("Loja"))
    }
}

// bcrypt é CPU-bound: roda fora do executor async
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: String) -> Result<bool, AppError> {
    let password = password.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

pub fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// 32 bytes aleatórios em hex. Só vai no e-mail; o banco guarda o hash.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn reset_link(site_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", site_url.trim_end_matches('/'), token)
}

pub fn encode_claims(secret: &str, session: &Session, now: i64, ttl_seconds: i64) -> Result<String, AppError> {
    let claims = Claims {
        sub: session.user_id.to_string(),
        phone: session.phone.clone(),
        role: session.role,
        business_id: session.business_id,
        exp: (now + ttl_seconds).max(0) as usize,
        iat: now.max(0) as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::invalid_token())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: 42,
            phone: "+905551112233".into(),
            role: Role::Staff,
            business_id: 3,
        }
    }

    #[test]
    fn token_round_trip_carries_the_session() {
        let now = Utc::now().timestamp();
        let token = encode_claims("segredo", &session(), now, 3600).unwrap();
        let claims = decode_claims("segredo", &token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.phone, "+905551112233");
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.business_id, 3);
        assert_eq!(claims.exp as i64 - claims.iat as i64, 3600);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = encode_claims("segredo", &session(), Utc::now().timestamp(), 3600).unwrap();
        let err = decode_claims("outro", &token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let issued = Utc::now().timestamp() - 7200;
        let token = encode_claims("segredo", &session(), issued, 3600).unwrap();
        assert!(matches!(decode_claims("segredo", &token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        assert!(matches!(decode_claims("segredo", "nao.e.jwt"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn reset_tokens_are_random_hex_and_hash_deterministically() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);

        assert_eq!(hash_reset_token(&a), hash_reset_token(&a));
        assert_ne!(hash_reset_token(&a), a);
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn reset_link_joins_without_double_slash() {
        assert_eq!(
            reset_link("https://loja.com/", "abc"),
            "https://loja.com/reset-password?token=abc"
        );
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email(Some("  Ana@Loja.COM ")), Some("ana@loja.com".into()));
        assert_eq!(normalize_email(Some("   ")), None);
        assert_eq!(normalize_email(None), None);
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", hashed.clone()).await.unwrap());
        assert!(!verify_password("errada", hashed).await.unwrap());
    }
}
