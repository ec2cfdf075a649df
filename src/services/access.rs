// src/services/access.rs

//! Política de acesso por recurso e papel.
//!
//! Cada recurso tem uma linha por papel na tabela `POLICY`; os serviços nunca
//! ramificam em `Role` diretamente para decidir visibilidade. Dois passos para
//! leitura de uma linha única:
//!
//! 1. buscar por `{id, business_id}`: ausente ou de outra loja vira `NotFound`
//!    (mesma mensagem nos dois casos);
//! 2. `authorize_row`: a linha existe na loja, mas o papel pode não enxergá-la,
//!    então o erro é `Forbidden`.

use crate::{
    common::error::AppError,
    db::scope::Scope,
    models::auth::{Role, Session},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customer,
    Order,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Loja inteira, leitura e escrita
    Tenant,
    /// Só linhas cuja coluna de dono é o usuário da sessão
    Owner(&'static str),
    /// Só leitura, ligada ao cadastro de cliente com o telefone da sessão
    CustomerLink(&'static str),
}

const POLICY: &[(Resource, Role, Rule)] = &[
    (Resource::Customer, Role::Admin, Rule::Tenant),
    (Resource::Customer, Role::Staff, Rule::Owner("created_by_user_id")),
    (Resource::Customer, Role::Customer, Rule::CustomerLink("id")),
    (Resource::Order, Role::Admin, Rule::Tenant),
    (Resource::Order, Role::Staff, Rule::Owner("created_by_user_id")),
    (Resource::Order, Role::Customer, Rule::CustomerLink("customer_id")),
    (Resource::Appointment, Role::Admin, Rule::Tenant),
    (Resource::Appointment, Role::Staff, Rule::Owner("staff_user_id")),
    (Resource::Appointment, Role::Customer, Rule::CustomerLink("customer_id")),
];

fn rule_for(resource: Resource, role: Role) -> Option<Rule> {
    POLICY
        .iter()
        .find(|(r, ro, _)| *r == resource && *ro == role)
        .map(|(_, _, rule)| *rule)
}

/// O que a política precisa saber de uma linha já carregada.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFacts<'a> {
    /// Valor da coluna de dono do recurso (criador ou profissional atribuído)
    pub owner_id: Option<i64>,
    /// Telefone do cliente ligado à linha; só consultado para CUSTOMER
    pub customer_phone: Option<&'a str>,
}

/// Predicado da listagem para esta sessão.
pub fn list_scope(session: &Session, resource: Resource) -> Result<Scope, AppError> {
    let business_id = session.business_id;
    match rule_for(resource, session.role) {
        Some(Rule::Tenant) => Ok(Scope::Tenant { business_id }),
        Some(Rule::Owner(column)) => Ok(Scope::Owner {
            business_id,
            column,
            user_id: session.user_id,
        }),
        Some(Rule::CustomerLink(customer_column)) => Ok(Scope::CustomerPhone {
            business_id,
            customer_column,
            phone: session.phone.clone(),
        }),
        None => Err(AppError::forbidden()),
    }
}

/// Converte "não achei na loja" em `NotFound`.
pub fn found<T>(row: Option<T>, entity: &str) -> Result<T, AppError> {
    row.ok_or_else(|| AppError::not_found(entity))
}

/// Segunda etapa da leitura de uma linha única (a linha já é da loja da sessão).
pub fn authorize_row(session: &Session, resource: Resource, facts: RowFacts<'_>) -> Result<(), AppError> {
    let allowed = match rule_for(resource, session.role) {
        Some(Rule::Tenant) => true,
        Some(Rule::Owner(_)) => facts.owner_id == Some(session.user_id),
        Some(Rule::CustomerLink(_)) => facts.customer_phone == Some(session.phone.as_str()),
        None => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

/// Escrita sobre uma linha: mesma checagem da leitura, mas o vínculo de cliente é só leitura.
pub fn authorize_row_write(
    session: &Session,
    resource: Resource,
    facts: RowFacts<'_>,
) -> Result<(), AppError> {
    ensure_can_write(session, resource)?;
    authorize_row(session, resource, facts)
}

/// Criação/escrita em geral: só papéis com regra de loja ou de dono.
pub fn ensure_can_write(session: &Session, resource: Resource) -> Result<(), AppError> {
    match rule_for(resource, session.role) {
        Some(Rule::Tenant) | Some(Rule::Owner(_)) => Ok(()),
        _ => Err(AppError::forbidden()),
    }
}

/// Só o papel CUSTOMER precisa do telefone do cliente ligado à linha.
pub fn needs_customer_phone(session: &Session, resource: Resource) -> bool {
    matches!(rule_for(resource, session.role), Some(Rule::CustomerLink(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: i64, role: Role) -> Session {
        Session {
            user_id,
            phone: format!("555000{}", user_id),
            role,
            business_id: 1,
        }
    }

    #[test]
    fn every_resource_has_a_rule_per_role() {
        for resource in [Resource::Customer, Resource::Order, Resource::Appointment] {
            for role in [Role::Admin, Role::Staff, Role::Customer] {
                assert!(rule_for(resource, role).is_some(), "{resource:?}/{role:?}");
            }
        }
    }

    #[test]
    fn admin_scope_is_the_whole_tenant() {
        let scope = list_scope(&session(1, Role::Admin), Resource::Order).unwrap();
        assert_eq!(scope, Scope::Tenant { business_id: 1 });
    }

    #[test]
    fn staff_scope_uses_resource_owner_column() {
        let staff = session(7, Role::Staff);
        assert_eq!(
            list_scope(&staff, Resource::Customer).unwrap(),
            Scope::Owner { business_id: 1, column: "created_by_user_id", user_id: 7 }
        );
        assert_eq!(
            list_scope(&staff, Resource::Appointment).unwrap(),
            Scope::Owner { business_id: 1, column: "staff_user_id", user_id: 7 }
        );
    }

    #[test]
    fn customer_scope_links_by_phone() {
        let customer = session(9, Role::Customer);
        assert_eq!(
            list_scope(&customer, Resource::Order).unwrap(),
            Scope::CustomerPhone {
                business_id: 1,
                customer_column: "customer_id",
                phone: "5550009".into(),
            }
        );
    }

    #[test]
    fn other_staff_gets_forbidden_for_owned_rows() {
        let owner = session(7, Role::Staff);
        let other = session(8, Role::Staff);
        let facts = RowFacts { owner_id: Some(7), customer_phone: None };

        for resource in [Resource::Customer, Resource::Order, Resource::Appointment] {
            assert!(authorize_row(&owner, resource, facts).is_ok());
            assert!(matches!(
                authorize_row(&other, resource, facts),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn unassigned_appointment_is_hidden_from_staff() {
        let staff = session(7, Role::Staff);
        let facts = RowFacts { owner_id: None, customer_phone: None };
        assert!(authorize_row(&staff, Resource::Appointment, facts).is_err());
    }

    #[test]
    fn admin_reads_any_row_in_tenant() {
        let admin = session(1, Role::Admin);
        let facts = RowFacts { owner_id: Some(99), customer_phone: None };
        assert!(authorize_row(&admin, Resource::Order, facts).is_ok());
        assert!(authorize_row_write(&admin, Resource::Order, facts).is_ok());
    }

    #[test]
    fn customer_reads_only_own_rows_and_never_writes() {
        let customer = session(9, Role::Customer);
        let own = RowFacts { owner_id: Some(1), customer_phone: Some("5550009") };
        let foreign = RowFacts { owner_id: Some(1), customer_phone: Some("5550001") };

        assert!(authorize_row(&customer, Resource::Order, own).is_ok());
        assert!(authorize_row(&customer, Resource::Order, foreign).is_err());
        assert!(matches!(
            authorize_row_write(&customer, Resource::Order, own),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_can_write(&customer, Resource::Customer).is_err());
        assert!(needs_customer_phone(&customer, Resource::Order));
        assert!(!needs_customer_phone(&session(1, Role::Admin), Resource::Order));
    }

    #[test]
    fn missing_and_cross_tenant_rows_share_the_same_error() {
        // Ambos chegam aqui como `None`: a busca já filtrou por business_id.
        let missing = found::<i64>(None, "Pedido").unwrap_err();
        let cross_tenant = found::<i64>(None, "Pedido").unwrap_err();
        assert_eq!(missing.to_string(), cross_tenant.to_string());
        assert_eq!(missing.status(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(found(Some(5), "Pedido").unwrap(), 5);
    }
}
