// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{common::error::AppError, db::scope::Scope, models::customer::Customer};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        business_id: i64,
        created_by_user_id: i64,
        name: &str,
        phone: Option<&str>,
        balance_cents: i64,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (business_id, created_by_user_id, name, phone, balance_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(created_by_user_id)
        .bind(name)
        .bind(phone)
        .bind(balance_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn list(&self, scope: &Scope) -> Result<Vec<Customer>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM customers");
        scope.push_where(&mut qb);
        qb.push(" ORDER BY name ASC");

        let customers = qb
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    /// Filtra só por `{id, business_id}`; a checagem de dono vem depois.
    pub async fn find_in_business<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        id: i64,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn find_by_phone(
        &self,
        business_id: i64,
        phone: &str,
    ) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE business_id = $1 AND phone = $2 ORDER BY id ASC",
        )
        .bind(business_id)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn update(
        &self,
        business_id: i64,
        id: i64,
        name: Option<&str>,
        phone: Option<&str>,
        balance_cents: Option<i64>,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                balance_cents = COALESCE($5, balance_cents),
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(name)
        .bind(phone)
        .bind(balance_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn delete(&self, business_id: i64, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM customers WHERE id = $1 AND business_id = $2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // Cliente com pedidos/agendamentos não pode sumir
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::BadRequest(
                            "Cliente possui pedidos ou agendamentos e não pode ser removido.".into(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(())
    }
}
