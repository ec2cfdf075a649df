// src/services/order_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, money::parse_positive_cents},
    db::{CustomerRepository, OrderRepository, OrderStatusRepository, ProductRepository},
    models::{
        auth::Session,
        order::{
            CreateOrderPayload, CreatePaymentPayload, Order, OrderDetail, OrderQuery, OrderSource, Payment,
            UpdateOrderPayload,
        },
        settings::ORDER_DEFAULT_STATUS_KEY,
    },
    services::{
        access::{self, Resource, RowFacts},
        pricing::{price_order, requested_product_ids},
        settings_service::SettingsService,
    },
};

pub const FALLBACK_STATUS_KEY: &str = "CREATED";

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    statuses: OrderStatusRepository,
    customers: CustomerRepository,
    products: ProductRepository,
    settings: SettingsService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        statuses: OrderStatusRepository,
        customers: CustomerRepository,
        products: ProductRepository,
        settings: SettingsService,
        pool: PgPool,
    ) -> Self {
        Self { orders, statuses, customers, products, settings, pool }
    }

    pub async fn list(&self, session: &Session, filter: &OrderQuery) -> Result<Vec<Order>, AppError> {
        let scope = access::list_scope(session, Resource::Order)?;
        self.orders.list(&scope, filter).await
    }

    pub async fn create(&self, session: &Session, payload: CreateOrderPayload) -> Result<OrderDetail, AppError> {
        access::ensure_can_write(session, Resource::Order)?;
        let business_id = session.business_id;

        let status_key = self
            .settings
            .get_json::<String>(business_id, ORDER_DEFAULT_STATUS_KEY)
            .await?
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_STATUS_KEY.to_string());

        // Tudo ou nada: nenhum item órfão fica visível se algo falhar no meio.
        let mut tx = self.pool.begin().await?;

        self.customers
            .find_in_business(&mut *tx, business_id, payload.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        let status = self
            .statuses
            .find_by_key(&mut *tx, business_id, status_key.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Status de pedido '{}' não está configurado nesta loja.",
                    status_key
                ))
            })?;

        let ids = requested_product_ids(&payload.items);
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.products.find_active_by_ids(&mut *tx, business_id, &ids).await?
        };
        let priced = price_order(&payload.items, &products)?;

        let order = self
            .orders
            .insert_order(
                &mut *tx,
                business_id,
                payload.customer_id,
                session.user_id,
                status.id,
                priced.total_amount_cents,
                payload.source.unwrap_or(OrderSource::Pos),
                payload.notes.as_deref(),
            )
            .await?;
        let items = self
            .orders
            .insert_items(&mut *tx, business_id, order.id, &priced.lines)
            .await?;

        tx.commit().await?;

        tracing::info!(
            business_id,
            order_id = order.id,
            total_amount_cents = order.total_amount_cents,
            items = items.len(),
            "🛒 Pedido criado"
        );

        Ok(OrderDetail { order, status, items, payments: Vec::new() })
    }

    pub async fn detail(&self, session: &Session, id: i64) -> Result<OrderDetail, AppError> {
        let order = self.load_authorized(session, id, false).await?;
        self.assemble(order).await
    }

    pub async fn update(&self, session: &Session, id: i64, payload: UpdateOrderPayload) -> Result<OrderDetail, AppError> {
        self.load_authorized(session, id, true).await?;

        let status_id = match payload.status_key.as_deref().map(str::trim) {
            Some(key) => Some(
                self.statuses
                    .find_by_key(&self.pool, session.business_id, key)
                    .await?
                    .ok_or_else(|| AppError::not_found("Status de pedido"))?
                    .id,
            ),
            None => None,
        };

        let order = self
            .orders
            .update(session.business_id, id, status_id, payload.notes.as_deref())
            .await?;
        self.assemble(order).await
    }

    pub async fn list_payments(&self, session: &Session, order_id: i64) -> Result<Vec<Payment>, AppError> {
        self.load_authorized(session, order_id, false).await?;
        self.orders.list_payments(session.business_id, order_id).await
    }

    /// Ledger só de inserção. A soma dos pagamentos não é conferida contra o total.
    pub async fn add_payment(
        &self,
        session: &Session,
        order_id: i64,
        payload: CreatePaymentPayload,
    ) -> Result<Payment, AppError> {
        self.load_authorized(session, order_id, true).await?;
        let amount_cents = parse_positive_cents("amountCents", &payload.amount_cents)?;

        let payment = self
            .orders
            .insert_payment(
                session.business_id,
                order_id,
                amount_cents,
                payload.method,
                payload.reference.as_deref(),
            )
            .await?;

        tracing::info!(order_id, amount_cents, method = ?payment.method, "💰 Pagamento registrado");
        Ok(payment)
    }

    async fn load_authorized(&self, session: &Session, id: i64, write: bool) -> Result<Order, AppError> {
        let order = access::found(
            self.orders.find_in_business(session.business_id, id).await?,
            "Pedido",
        )?;

        let customer = if access::needs_customer_phone(session, Resource::Order) {
            self.customers
                .find_in_business(&self.pool, session.business_id, order.customer_id)
                .await?
        } else {
            None
        };

        let facts = RowFacts {
            owner_id: Some(order.created_by_user_id),
            customer_phone: customer.as_ref().and_then(|c| c.phone.as_deref()),
        };
        if write {
            access::authorize_row_write(session, Resource::Order, facts)?;
        } else {
            access::authorize_row(session, Resource::Order, facts)?;
        }
        Ok(order)
    }

    async fn assemble(&self, order: Order) -> Result<OrderDetail, AppError> {
        let status = self
            .statuses
            .find_in_business(&self.pool, order.business_id, order.status_id)
            .await?
            .ok_or_else(|| AppError::not_found("Status de pedido"))?;
        let items = self.orders.list_items(order.business_id, order.id).await?;
        let payments = self.orders.list_payments(order.business_id, order.id).await?;

        Ok(OrderDetail { order, status, items, payments })
    }
}
