// src/services/order_status_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::OrderStatusRepository,
    models::order::{CreateOrderStatusPayload, OrderStatus, UpdateOrderStatusPayload},
};

#[derive(Clone)]
pub struct OrderStatusService {
    repo: OrderStatusRepository,
    pool: PgPool,
}

impl OrderStatusService {
    pub fn new(repo: OrderStatusRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<OrderStatus>, AppError> {
        self.repo.list(business_id).await
    }

    pub async fn get(&self, business_id: i64, id: i64) -> Result<OrderStatus, AppError> {
        self.repo
            .find_in_business(&self.pool, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Status de pedido"))
    }

    /// `isDefault` é um slot único por loja: limpar o anterior e gravar o novo
    /// acontecem na mesma transação, com a loja travada.
    pub async fn create(&self, business_id: i64, payload: CreateOrderStatusPayload) -> Result<OrderStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        if payload.is_default {
            self.repo.lock_business(&mut *tx, business_id).await?;
            let cleared = self.repo.clear_default(&mut *tx, business_id, None).await?;
            tracing::info!(business_id, cleared, "🏷️ Status padrão substituído");
        }

        let status = self
            .repo
            .create(
                &mut *tx,
                business_id,
                payload.key.trim(),
                payload.label.trim(),
                payload.order_index,
                payload.is_final,
                payload.is_default,
            )
            .await?;

        tx.commit().await?;
        Ok(status)
    }

    pub async fn update(
        &self,
        business_id: i64,
        id: i64,
        payload: UpdateOrderStatusPayload,
    ) -> Result<OrderStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo
            .find_in_business(&mut *tx, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Status de pedido"))?;

        if payload.is_default == Some(true) {
            self.repo.lock_business(&mut *tx, business_id).await?;
            let cleared = self.repo.clear_default(&mut *tx, business_id, Some(id)).await?;
            tracing::info!(business_id, status_id = id, cleared, "🏷️ Status padrão substituído");
        }

        let status = self
            .repo
            .update(
                &mut *tx,
                business_id,
                id,
                payload.key.as_deref().map(str::trim),
                payload.label.as_deref().map(str::trim),
                payload.order_index,
                payload.is_final,
                payload.is_default,
            )
            .await?;

        tx.commit().await?;
        Ok(status)
    }

    pub async fn delete(&self, business_id: i64, id: i64) -> Result<(), AppError> {
        self.get(business_id, id).await?;
        self.repo.delete(business_id, id).await
    }
}
