// src/handlers/appointments.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::{
        error::AppError,
        response::{ApiPath, ApiQuery, ApiResponse, ValidatedJson},
    },
    config::AppState,
    middleware::rbac::{AnyRole, RequireRole},
    models::appointment::{
        Appointment, AppointmentQuery, CreateAppointmentPayload, UpdateAppointmentPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    params(
        ("from" = Option<String>, Query, description = "Início mínimo (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Início máximo (RFC 3339)")
    ),
    responses((status = 200, description = "Agendamentos visíveis para o papel", body = Vec<Appointment>)),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiQuery(query): ApiQuery<AppointmentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = app_state.appointment_service.list(&session, &query).await?;
    Ok(ApiResponse::ok(appointments))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Appointment),
        (status = 400, description = "Janela de horário inválida"),
        (status = 403, description = "STAFF sem permissão de agendar")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ValidatedJson(payload): ValidatedJson<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(appointment)))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    params(("id" = i64, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento", body = Appointment),
        (status = 403, description = "Agendamento de outro atendente"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_appointment(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.get(&session, id).await?;
    Ok(ApiResponse::ok(appointment))
}

#[utoipa::path(
    patch,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    params(("id" = i64, Path, description = "ID do agendamento")),
    request_body = UpdateAppointmentPayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = Appointment),
        (status = 400, description = "Janela de horário inválida"),
        (status = 403, description = "Alteração não permitida para o papel"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_appointment(
    State(app_state): State<AppState>,
    RequireRole(session, _): RequireRole<AnyRole>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state
        .appointment_service
        .update(&session, id, payload)
        .await?;
    Ok(ApiResponse::ok(appointment))
}
