// src/db/scope.rs

use sqlx::{Postgres, QueryBuilder};

/// Predicado de linha já resolvido pela política de acesso.
/// Todo SELECT escopado começa por `business_id`; o resto depende do papel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// ADMIN: tudo da loja
    Tenant { business_id: i64 },
    /// STAFF: só linhas cuja coluna de "dono" é o próprio usuário
    Owner {
        business_id: i64,
        column: &'static str,
        user_id: i64,
    },
    /// CUSTOMER: linhas ligadas a um cadastro de cliente com o mesmo telefone
    CustomerPhone {
        business_id: i64,
        customer_column: &'static str,
        phone: String,
    },
}

impl Scope {
    pub fn business_id(&self) -> i64 {
        match self {
            Scope::Tenant { business_id }
            | Scope::Owner { business_id, .. }
            | Scope::CustomerPhone { business_id, .. } => *business_id,
        }
    }

    /// Anexa ` WHERE ...` à query. Chamadores acrescentam filtros extras com ` AND`.
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        qb.push(" WHERE business_id = ").push_bind(self.business_id());

        match self {
            Scope::Tenant { .. } => {}
            Scope::Owner { column, user_id, .. } => {
                qb.push(" AND ").push(*column).push(" = ").push_bind(*user_id);
            }
            Scope::CustomerPhone {
                business_id,
                customer_column,
                phone,
            } => {
                qb.push(" AND ")
                    .push(*customer_column)
                    .push(" IN (SELECT id FROM customers WHERE business_id = ")
                    .push_bind(*business_id)
                    .push(" AND phone = ")
                    .push_bind(phone.clone())
                    .push(")");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(scope: &Scope) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders");
        scope.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn tenant_scope_filters_only_business() {
        assert_eq!(
            render(&Scope::Tenant { business_id: 1 }),
            "SELECT * FROM orders WHERE business_id = $1"
        );
    }

    #[test]
    fn owner_scope_adds_owner_column() {
        let scope = Scope::Owner {
            business_id: 1,
            column: "created_by_user_id",
            user_id: 7,
        };
        assert_eq!(
            render(&scope),
            "SELECT * FROM orders WHERE business_id = $1 AND created_by_user_id = $2"
        );
    }

    #[test]
    fn customer_scope_joins_by_phone() {
        let scope = Scope::CustomerPhone {
            business_id: 3,
            customer_column: "customer_id",
            phone: "555".into(),
        };
        assert_eq!(
            render(&scope),
            "SELECT * FROM orders WHERE business_id = $1 AND customer_id IN \
             (SELECT id FROM customers WHERE business_id = $2 AND phone = $3)"
        );
        assert_eq!(scope.business_id(), 3);
    }
}
