// src/services/customer_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, money::parse_cents},
    db::CustomerRepository,
    models::{
        auth::Session,
        customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
    },
    services::access::{self, Resource, RowFacts},
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    pool: PgPool,
}

fn facts(customer: &Customer) -> RowFacts<'_> {
    RowFacts {
        owner_id: Some(customer.created_by_user_id),
        customer_phone: customer.phone.as_deref(),
    }
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Customer>, AppError> {
        let scope = access::list_scope(session, Resource::Customer)?;
        self.repo.list(&scope).await
    }

    pub async fn get(&self, session: &Session, id: i64) -> Result<Customer, AppError> {
        let customer = self.load(session, id).await?;
        access::authorize_row(session, Resource::Customer, facts(&customer))?;
        Ok(customer)
    }

    /// Cadastros de cliente ligados ao telefone da sessão, na loja da sessão.
    pub async fn me(&self, session: &Session) -> Result<Vec<Customer>, AppError> {
        self.repo.find_by_phone(session.business_id, &session.phone).await
    }

    pub async fn create(&self, session: &Session, payload: CreateCustomerPayload) -> Result<Customer, AppError> {
        access::ensure_can_write(session, Resource::Customer)?;

        let balance_cents = match payload.balance_cents.as_deref() {
            Some(raw) => parse_cents("balanceCents", raw)?,
            None => 0,
        };
        let phone = payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

        let customer = self
            .repo
            .create(
                session.business_id,
                session.user_id,
                payload.name.trim(),
                phone,
                balance_cents,
            )
            .await?;

        tracing::info!(customer_id = customer.id, created_by = session.user_id, "🧾 Cliente cadastrado");
        Ok(customer)
    }

    pub async fn update(&self, session: &Session, id: i64, payload: UpdateCustomerPayload) -> Result<Customer, AppError> {
        let customer = self.load(session, id).await?;
        access::authorize_row_write(session, Resource::Customer, facts(&customer))?;

        let balance_cents = match payload.balance_cents.as_deref() {
            Some(raw) => Some(parse_cents("balanceCents", raw)?),
            None => None,
        };

        self.repo
            .update(
                session.business_id,
                id,
                payload.name.as_deref().map(str::trim),
                payload.phone.as_deref().map(str::trim),
                balance_cents,
            )
            .await
    }

    pub async fn delete(&self, session: &Session, id: i64) -> Result<(), AppError> {
        let customer = self.load(session, id).await?;
        access::authorize_row_write(session, Resource::Customer, facts(&customer))?;

        self.repo.delete(session.business_id, id).await?;
        tracing::info!(customer_id = id, "🧾 Cliente removido");
        Ok(())
    }

    async fn load(&self, session: &Session, id: i64) -> Result<Customer, AppError> {
        access::found(
            self.repo.find_in_business(&self.pool, session.business_id, id).await?,
            "Cliente",
        )
    }
}
