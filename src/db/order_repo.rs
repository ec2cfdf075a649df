// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::scope::Scope,
    models::order::{Order, OrderItem, OrderQuery, OrderSource, Payment, PaymentMethod},
    services::pricing::PricedLine,
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn list(&self, scope: &Scope, filter: &OrderQuery) -> Result<Vec<Order>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders");
        scope.push_where(&mut qb);

        if let Some(customer_id) = filter.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(key) = filter.status_key.as_deref() {
            qb.push(" AND status_id IN (SELECT id FROM order_statuses WHERE business_id = ")
                .push_bind(scope.business_id())
                .push(" AND key = ")
                .push_bind(key.to_string())
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC");

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    pub async fn find_in_business(&self, business_id: i64, id: i64) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        customer_id: i64,
        created_by_user_id: i64,
        status_id: i64,
        total_amount_cents: i64,
        source: OrderSource,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                business_id, customer_id, created_by_user_id, status_id,
                total_amount_cents, source, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(customer_id)
        .bind(created_by_user_id)
        .bind(status_id)
        .bind(total_amount_cents)
        .bind(source)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    /// Inserção em massa dos itens usando UNNEST
    pub async fn insert_items<'e, E>(
        &self,
        executor: E,
        business_id: i64,
        order_id: i64,
        lines: &[PricedLine],
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();
        let unit_prices: Vec<i64> = lines.iter().map(|l| l.unit_price_cents).collect();
        let totals: Vec<i64> = lines.iter().map(|l| l.total_amount_cents).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (
                business_id, order_id, product_id, quantity, unit_price_cents, total_amount_cents
            )
            SELECT $1, $2, * FROM UNNEST($3::BIGINT[], $4::INT[], $5::BIGINT[], $6::BIGINT[])
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(order_id)
        .bind(&product_ids)
        .bind(&quantities)
        .bind(&unit_prices)
        .bind(&totals)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_items(&self, business_id: i64, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE business_id = $1 AND order_id = $2 ORDER BY id ASC",
        )
        .bind(business_id)
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn update(
        &self,
        business_id: i64,
        id: i64,
        status_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                status_id = COALESCE($3, status_id),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(status_id)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    // =========================================================================
    //  PAGAMENTOS (só inserção; não existe update nem delete)
    // =========================================================================

    pub async fn insert_payment(
        &self,
        business_id: i64,
        order_id: i64,
        amount_cents: i64,
        method: PaymentMethod,
        reference: Option<&str>,
    ) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (business_id, order_id, amount_cents, method, reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(order_id)
        .bind(amount_cents)
        .bind(method)
        .bind(reference)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    pub async fn list_payments(&self, business_id: i64, order_id: i64) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE business_id = $1 AND order_id = $2 ORDER BY created_at ASC, id ASC",
        )
        .bind(business_id)
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }
}
