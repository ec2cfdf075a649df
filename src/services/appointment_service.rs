// src/services/appointment_service.rs

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        appointment_repo::{AppointmentChanges, NewAppointment},
        AppointmentRepository, CustomerRepository, UserRepository,
    },
    models::{
        appointment::{
            Appointment, AppointmentQuery, AppointmentStatus, CreateAppointmentPayload, UpdateAppointmentPayload,
        },
        auth::{Role, Session},
        settings::{APPOINTMENT_ALLOW_STAFF_CREATE, APPOINTMENT_AUTO_CONFIRM, APPOINTMENT_DEFAULT_DURATION},
    },
    services::{
        access::{self, Resource, RowFacts},
        settings_service::{value_as_bool, value_as_i64, SettingsService},
    },
};

const FALLBACK_DURATION_MINUTES: i64 = 60;
// Uma semana: acima disso o valor configurado é tratado como inválido
const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// Padrões de agendamento da loja, já com os fallbacks aplicados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentDefaults {
    pub duration_minutes: i64,
    pub auto_confirm: bool,
    pub allow_staff_create: bool,
}

impl AppointmentDefaults {
    pub fn from_values(duration: Option<&Value>, auto_confirm: Option<&Value>, allow_staff_create: Option<&Value>) -> Self {
        Self {
            duration_minutes: duration
                .and_then(value_as_i64)
                .filter(|m| (1..=MAX_DURATION_MINUTES).contains(m))
                .unwrap_or(FALLBACK_DURATION_MINUTES),
            auto_confirm: auto_confirm.and_then(value_as_bool).unwrap_or(false),
            allow_staff_create: allow_staff_create.and_then(value_as_bool).unwrap_or(false),
        }
    }

    pub async fn resolve(settings: &SettingsService, business_id: i64) -> Result<Self, AppError> {
        let duration = settings.get_value(business_id, APPOINTMENT_DEFAULT_DURATION).await?;
        let auto_confirm = settings.get_value(business_id, APPOINTMENT_AUTO_CONFIRM).await?;
        let allow_staff_create = settings.get_value(business_id, APPOINTMENT_ALLOW_STAFF_CREATE).await?;

        Ok(Self::from_values(
            duration.as_ref(),
            auto_confirm.as_ref(),
            allow_staff_create.as_ref(),
        ))
    }

    pub fn initial_status(&self) -> AppointmentStatus {
        if self.auto_confirm {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Scheduled
        }
    }
}

/// Quem fica com o agendamento. STAFF sem `staffUserId` assume o próprio.
pub fn resolve_assignee(
    session: &Session,
    requested: Option<i64>,
    allow_staff_create: bool,
) -> Result<Option<i64>, AppError> {
    match session.role {
        Role::Admin => Ok(requested),
        Role::Staff => {
            if !allow_staff_create {
                return Err(AppError::Forbidden(
                    "A criação de agendamentos pela equipe está desativada nesta loja.".into(),
                ));
            }
            match requested {
                Some(id) if id != session.user_id => Err(AppError::Forbidden(
                    "Você só pode criar agendamentos para si mesmo.".into(),
                )),
                _ => Ok(Some(session.user_id)),
            }
        }
        Role::Customer => Err(AppError::forbidden()),
    }
}

/// Aplica o patch permitido ao papel e devolve o estado final.
/// STAFF só mexe em status e observações.
pub fn apply_update(
    session: &Session,
    current: &Appointment,
    payload: UpdateAppointmentPayload,
) -> Result<AppointmentChanges, AppError> {
    if session.role != Role::Admin {
        let reassigns = matches!(payload.staff_user_id, Some(next) if next != current.staff_user_id);
        if reassigns || payload.start_at.is_some() || payload.end_at.is_some() || payload.service_name.is_some() {
            return Err(AppError::Forbidden(
                "A equipe só pode alterar o status e as observações do agendamento.".into(),
            ));
        }
    }

    let start_at = payload.start_at.unwrap_or(current.start_at);
    // Mudar só o início preserva a duração
    let end_at = match (payload.start_at, payload.end_at) {
        (_, Some(end)) => end,
        (Some(start), None) => start
            .checked_add_signed(current.end_at - current.start_at)
            .ok_or_else(out_of_range)?,
        (None, None) => current.end_at,
    };
    ensure_window(start_at, end_at)?;

    Ok(AppointmentChanges {
        staff_user_id: payload.staff_user_id.unwrap_or(current.staff_user_id),
        start_at,
        end_at,
        status: payload.status.unwrap_or(current.status),
        service_name: payload.service_name.or_else(|| current.service_name.clone()),
        notes: payload.notes.or_else(|| current.notes.clone()),
    })
}

/// Início + duração, sem estourar o intervalo de datas representável.
pub fn add_minutes(start: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> AppError {
    AppError::BadRequest("Data do agendamento fora do intervalo permitido.".into())
}

fn ensure_window(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Result<(), AppError> {
    if end_at <= start_at {
        return Err(AppError::BadRequest(
            "O término do agendamento deve ser depois do início.".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AppointmentService {
    appointments: AppointmentRepository,
    customers: CustomerRepository,
    users: UserRepository,
    settings: SettingsService,
    pool: PgPool,
}

impl AppointmentService {
    pub fn new(
        appointments: AppointmentRepository,
        customers: CustomerRepository,
        users: UserRepository,
        settings: SettingsService,
        pool: PgPool,
    ) -> Self {
        Self { appointments, customers, users, settings, pool }
    }

    pub async fn list(&self, session: &Session, filter: &AppointmentQuery) -> Result<Vec<Appointment>, AppError> {
        let scope = access::list_scope(session, Resource::Appointment)?;
        self.appointments.list(&scope, filter).await
    }

    pub async fn get(&self, session: &Session, id: i64) -> Result<Appointment, AppError> {
        self.load_authorized(session, id, false).await
    }

    pub async fn create(&self, session: &Session, payload: CreateAppointmentPayload) -> Result<Appointment, AppError> {
        access::ensure_can_write(session, Resource::Appointment)?;
        let business_id = session.business_id;

        let defaults = AppointmentDefaults::resolve(&self.settings, business_id).await?;
        let staff_user_id = resolve_assignee(session, payload.staff_user_id, defaults.allow_staff_create)?;

        self.customers
            .find_in_business(&self.pool, business_id, payload.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        if let Some(staff_id) = staff_user_id {
            self.ensure_staff_member(business_id, staff_id).await?;
        }

        let end_at = match payload.end_at {
            Some(end) => end,
            None => add_minutes(payload.start_at, defaults.duration_minutes)?,
        };
        ensure_window(payload.start_at, end_at)?;

        let appointment = self
            .appointments
            .create(NewAppointment {
                business_id,
                customer_id: payload.customer_id,
                staff_user_id,
                start_at: payload.start_at,
                end_at,
                status: defaults.initial_status(),
                service_name: payload.service_name.as_deref(),
                notes: payload.notes.as_deref(),
                created_by_user_id: session.user_id,
            })
            .await?;

        tracing::info!(
            business_id,
            appointment_id = appointment.id,
            staff_user_id = ?appointment.staff_user_id,
            "📅 Agendamento criado"
        );
        Ok(appointment)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: i64,
        payload: UpdateAppointmentPayload,
    ) -> Result<Appointment, AppError> {
        let current = self.load_authorized(session, id, true).await?;

        if let Some(Some(staff_id)) = payload.staff_user_id {
            if Some(staff_id) != current.staff_user_id {
                self.ensure_staff_member(session.business_id, staff_id).await?;
            }
        }

        let changes = apply_update(session, &current, payload)?;
        self.appointments.update(session.business_id, id, changes).await
    }

    async fn ensure_staff_member(&self, business_id: i64, user_id: i64) -> Result<(), AppError> {
        let user = self
            .users
            .find_in_business(business_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profissional"))?;

        if user.role == Role::Customer || !user.is_active {
            return Err(AppError::BadRequest(
                "O profissional informado não faz parte da equipe ativa.".into(),
            ));
        }
        Ok(())
    }

    async fn load_authorized(&self, session: &Session, id: i64, write: bool) -> Result<Appointment, AppError> {
        let appointment = access::found(
            self.appointments.find_in_business(session.business_id, id).await?,
            "Agendamento",
        )?;

        let customer = if access::needs_customer_phone(session, Resource::Appointment) {
            self.customers
                .find_in_business(&self.pool, session.business_id, appointment.customer_id)
                .await?
        } else {
            None
        };

        let facts = RowFacts {
            owner_id: appointment.staff_user_id,
            customer_phone: customer.as_ref().and_then(|c| c.phone.as_deref()),
        };
        if write {
            access::authorize_row_write(session, Resource::Appointment, facts)?;
        } else {
            access::authorize_row(session, Resource::Appointment, facts)?;
        }
        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn session(user_id: i64, role: Role) -> Session {
        Session { user_id, phone: "555".into(), role, business_id: 1 }
    }

    fn appointment(staff_user_id: Option<i64>) -> Appointment {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap();
        Appointment {
            id: 1,
            business_id: 1,
            customer_id: 1,
            staff_user_id,
            start_at: start,
            end_at: start + Duration::minutes(45),
            status: AppointmentStatus::Scheduled,
            service_name: Some("Corte".into()),
            notes: None,
            created_by_user_id: 1,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn defaults_fall_back_when_settings_are_missing_or_malformed() {
        let defaults = AppointmentDefaults::from_values(None, None, None);
        assert_eq!(
            defaults,
            AppointmentDefaults { duration_minutes: 60, auto_confirm: false, allow_staff_create: false }
        );
        assert_eq!(defaults.initial_status(), AppointmentStatus::Scheduled);

        let odd = AppointmentDefaults::from_values(Some(&json!("muito")), Some(&json!([1])), Some(&json!(-1)));
        assert_eq!(odd.duration_minutes, 60);
        assert!(!odd.auto_confirm);

        assert_eq!(AppointmentDefaults::from_values(Some(&json!(0)), None, None).duration_minutes, 60);
    }

    #[test]
    fn absurd_duration_setting_falls_back_instead_of_overflowing() {
        for huge in [json!(1_000_000_000_000i64), json!(i64::MAX), json!("9223372036854775807")] {
            let defaults = AppointmentDefaults::from_values(Some(&huge), None, None);
            assert_eq!(defaults.duration_minutes, 60, "valor: {huge}");
        }
        assert_eq!(
            AppointmentDefaults::from_values(Some(&json!(10_080)), None, None).duration_minutes,
            10_080
        );
    }

    #[test]
    fn adding_minutes_past_the_calendar_is_bad_request() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap();
        assert_eq!(add_minutes(start, 30).unwrap(), start + Duration::minutes(30));
        assert!(matches!(add_minutes(start, i64::MAX), Err(AppError::BadRequest(_))));
        assert!(matches!(add_minutes(DateTime::<Utc>::MAX_UTC, 1), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn reschedule_near_the_last_date_is_bad_request() {
        let admin = session(1, Role::Admin);
        let current = appointment(Some(7));
        let payload = UpdateAppointmentPayload {
            start_at: Some(DateTime::<Utc>::MAX_UTC - Duration::minutes(1)),
            ..Default::default()
        };
        assert!(matches!(apply_update(&admin, &current, payload), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn defaults_read_configured_values() {
        let defaults = AppointmentDefaults::from_values(Some(&json!("30")), Some(&json!(true)), Some(&json!(true)));
        assert_eq!(defaults.duration_minutes, 30);
        assert!(defaults.allow_staff_create);
        assert_eq!(defaults.initial_status(), AppointmentStatus::Confirmed);
    }

    #[test]
    fn staff_creation_depends_on_setting_and_self_assigns() {
        let staff = session(7, Role::Staff);
        assert!(matches!(resolve_assignee(&staff, None, false), Err(AppError::Forbidden(_))));
        assert_eq!(resolve_assignee(&staff, None, true).unwrap(), Some(7));
        assert_eq!(resolve_assignee(&staff, Some(7), true).unwrap(), Some(7));
        assert!(matches!(resolve_assignee(&staff, Some(8), true), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn admin_assigns_freely_and_customer_cannot_create() {
        assert_eq!(resolve_assignee(&session(1, Role::Admin), Some(8), false).unwrap(), Some(8));
        assert_eq!(resolve_assignee(&session(1, Role::Admin), None, false).unwrap(), None);
        assert!(resolve_assignee(&session(9, Role::Customer), None, true).is_err());
    }

    #[test]
    fn staff_updates_only_status_and_notes() {
        let staff = session(7, Role::Staff);
        let current = appointment(Some(7));

        let ok = apply_update(
            &staff,
            &current,
            UpdateAppointmentPayload {
                status: Some(AppointmentStatus::Completed),
                notes: Some("Cliente pontual".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ok.status, AppointmentStatus::Completed);
        assert_eq!(ok.notes.as_deref(), Some("Cliente pontual"));
        assert_eq!(ok.staff_user_id, Some(7));
        assert_eq!(ok.start_at, current.start_at);

        let reassign = UpdateAppointmentPayload { staff_user_id: Some(Some(8)), ..Default::default() };
        assert!(matches!(apply_update(&staff, &current, reassign), Err(AppError::Forbidden(_))));

        let unassign = UpdateAppointmentPayload { staff_user_id: Some(None), ..Default::default() };
        assert!(matches!(apply_update(&staff, &current, unassign), Err(AppError::Forbidden(_))));

        let same = UpdateAppointmentPayload { staff_user_id: Some(Some(7)), ..Default::default() };
        assert_eq!(apply_update(&staff, &current, same).unwrap().staff_user_id, Some(7));

        let reschedule = UpdateAppointmentPayload { start_at: Some(current.end_at), ..Default::default() };
        assert!(matches!(apply_update(&staff, &current, reschedule), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn admin_reschedule_keeps_duration() {
        let admin = session(1, Role::Admin);
        let current = appointment(Some(7));
        let new_start = current.start_at + Duration::hours(2);

        let changes = apply_update(
            &admin,
            &current,
            UpdateAppointmentPayload { start_at: Some(new_start), staff_user_id: Some(Some(8)), ..Default::default() },
        )
        .unwrap();

        assert_eq!(changes.start_at, new_start);
        assert_eq!(changes.end_at, new_start + Duration::minutes(45));
        assert_eq!(changes.staff_user_id, Some(8));
        assert_eq!(changes.service_name.as_deref(), Some("Corte"));
    }

    #[test]
    fn admin_clears_assignee_with_explicit_null() {
        let admin = session(1, Role::Admin);
        let current = appointment(Some(7));

        let kept = apply_update(&admin, &current, UpdateAppointmentPayload::default()).unwrap();
        assert_eq!(kept.staff_user_id, Some(7));

        let cleared = apply_update(
            &admin,
            &current,
            UpdateAppointmentPayload { staff_user_id: Some(None), ..Default::default() },
        )
        .unwrap();
        assert_eq!(cleared.staff_user_id, None);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let admin = session(1, Role::Admin);
        let current = appointment(None);
        let payload = UpdateAppointmentPayload { end_at: Some(current.start_at), ..Default::default() };
        assert!(matches!(apply_update(&admin, &current, payload), Err(AppError::BadRequest(_))));
    }
}
