// src/middleware/staff_self.rs

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    common::{error::AppError, response::ApiPath},
    models::auth::{Role, Session},
};

/// Qual parâmetro da rota identifica o "próprio" usuário.
/// Usado como estado de `from_fn_with_state` em `route_layer`.
#[derive(Debug, Clone, Copy)]
pub enum SelfRule {
    Id(&'static str),
    Phone(&'static str),
}

/// STAFF só acessa o próprio registro; ADMIN passa direto.
pub async fn staff_self_guard(
    State(rule): State<SelfRule>,
    ApiPath(params): ApiPath<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = request
        .extensions()
        .get::<Session>()
        .ok_or_else(AppError::invalid_token)?;

    check_self(rule, session, &params)?;
    Ok(next.run(request).await)
}

fn check_self(rule: SelfRule, session: &Session, params: &HashMap<String, String>) -> Result<(), AppError> {
    match session.role {
        Role::Admin => return Ok(()),
        Role::Customer => return Err(AppError::forbidden()),
        Role::Staff => {}
    }

    let is_self = match rule {
        SelfRule::Id(name) => params
            .get(name)
            .and_then(|v| v.parse::<i64>().ok())
            .is_some_and(|id| id == session.user_id),
        SelfRule::Phone(name) => params
            .get(name)
            .is_some_and(|phone| phone.trim() == session.phone),
    };

    if is_self {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Você só pode consultar o seu próprio usuário.".into(),
        ))
    }
}
