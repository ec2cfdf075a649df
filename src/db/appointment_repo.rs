// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::scope::Scope,
    models::appointment::{Appointment, AppointmentQuery, AppointmentStatus},
};

pub struct NewAppointment<'a> {
    pub business_id: i64,
    pub customer_id: i64,
    pub staff_user_id: Option<i64>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub service_name: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_by_user_id: i64,
}

/// Estado final do agendamento depois de aplicar o patch permitido ao papel.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentChanges {
    pub staff_user_id: Option<i64>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub service_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: &Scope, filter: &AppointmentQuery) -> Result<Vec<Appointment>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM appointments");
        scope.push_where(&mut qb);

        if let Some(from) = filter.from {
            qb.push(" AND start_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND start_at < ").push_bind(to);
        }
        qb.push(" ORDER BY start_at ASC, id ASC");

        let appointments = qb.build_query_as::<Appointment>().fetch_all(&self.pool).await?;
        Ok(appointments)
    }

    pub async fn find_in_business(&self, business_id: i64, id: i64) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(appointment)
    }

    pub async fn create(&self, new: NewAppointment<'_>) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                business_id, customer_id, staff_user_id, start_at, end_at,
                status, service_name, notes, created_by_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.business_id)
        .bind(new.customer_id)
        .bind(new.staff_user_id)
        .bind(new.start_at)
        .bind(new.end_at)
        .bind(new.status)
        .bind(new.service_name)
        .bind(new.notes)
        .bind(new.created_by_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(appointment)
    }

    pub async fn update(
        &self,
        business_id: i64,
        id: i64,
        changes: AppointmentChanges,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET
                staff_user_id = $3,
                start_at = $4,
                end_at = $5,
                status = $6,
                service_name = $7,
                notes = $8,
                updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(changes.staff_user_id)
        .bind(changes.start_at)
        .bind(changes.end_at)
        .bind(changes.status)
        .bind(changes.service_name)
        .bind(changes.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(appointment)
    }
}
