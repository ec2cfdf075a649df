// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, Session},
};

/// 1. O trait que define quais papéis uma rota aceita
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// 2. O extrator (guardião). Roda depois do `auth_guard`, que já colocou a sessão.
pub struct RequireRole<T>(pub Session, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(session) = AuthenticatedUser::from_request_parts(parts, state).await?;
        check_role::<T>(&session)?;
        Ok(RequireRole(session, PhantomData))
    }
}

fn check_role<T: RoleSet>(session: &Session) -> Result<(), AppError> {
    if T::allowed().contains(&session.role) {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

// ---
// CONJUNTOS DE PAPÉIS
// ---

pub struct AdminOnly;
impl RoleSet for AdminOnly {
    fn allowed() -> &'static [Role] { &[Role::Admin] }
}

pub struct AdminOrStaff;
impl RoleSet for AdminOrStaff {
    fn allowed() -> &'static [Role] { &[Role::Admin, Role::Staff] }
}

pub struct AnyRole;
impl RoleSet for AnyRole {
    fn allowed() -> &'static [Role] { &[Role::Admin, Role::Staff, Role::Customer] }
}
