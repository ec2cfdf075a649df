// src/services/user_service.rs

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, UserRepository},
    models::auth::{CreateUserPayload, Role, Session, UpdateUserPayload, User},
    services::auth::{hash_password, normalize_email},
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<User>, AppError> {
        self.repo.list_by_business(session.business_id).await
    }

    /// Contas criadas pelo admin nascem na loja dele. Sem senha = conta só com telefone.
    pub async fn create(&self, session: &Session, payload: CreateUserPayload) -> Result<User, AppError> {
        let email = normalize_email(payload.email.as_deref());

        let password_hash = match payload.password.as_deref() {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };

        let user = self
            .repo
            .create_user(
                self.repo.pool(),
                NewUser {
                    business_id: session.business_id,
                    name: payload.name.trim(),
                    phone: payload.phone.trim(),
                    email: email.as_deref(),
                    password_hash: password_hash.as_deref(),
                    role: payload.role,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, role = ?user.role, "👤 Usuário criado pelo admin");
        Ok(user)
    }

    pub async fn get_by_id(&self, session: &Session, id: i64) -> Result<User, AppError> {
        self.repo
            .find_in_business(session.business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))
    }

    pub async fn get_by_phone(&self, session: &Session, phone: &str) -> Result<User, AppError> {
        self.repo
            .find_by_phone_in_business(session.business_id, phone.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))
    }

    pub async fn update(&self, session: &Session, id: i64, payload: UpdateUserPayload) -> Result<User, AppError> {
        check_self_update(session, id, &payload)?;

        self.repo
            .update_admin_fields(
                session.business_id,
                id,
                payload.name.as_deref().map(str::trim),
                payload.role,
                payload.is_active,
            )
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))
    }
}

// Um admin não pode se trancar para fora: nem se desativar nem perder o papel.
fn check_self_update(session: &Session, id: i64, payload: &UpdateUserPayload) -> Result<(), AppError> {
    if session.user_id != id {
        return Ok(());
    }
    if payload.is_active == Some(false) {
        return Err(AppError::BadRequest("Você não pode desativar a própria conta.".into()));
    }
    if matches!(payload.role, Some(role) if role != session.role) {
        return Err(AppError::BadRequest("Você não pode alterar o próprio papel.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Session {
        Session { user_id: 1, phone: "555".into(), role: Role::Admin, business_id: 1 }
    }

    fn update(role: Option<Role>, is_active: Option<bool>) -> UpdateUserPayload {
        UpdateUserPayload { name: None, role, is_active }
    }

    #[test]
    fn admin_cannot_lock_themselves_out() {
        assert!(check_self_update(&admin(), 1, &update(None, Some(false))).is_err());
        assert!(check_self_update(&admin(), 1, &update(Some(Role::Staff), None)).is_err());
        assert!(check_self_update(&admin(), 1, &update(Some(Role::Admin), Some(true))).is_ok());
    }

    #[test]
    fn admin_may_change_other_accounts() {
        assert!(check_self_update(&admin(), 2, &update(Some(Role::Customer), Some(false))).is_ok());
    }
}
