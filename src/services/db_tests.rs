// src/services/db_tests.rs
//
// Regras que só o Postgres garante (transação, travas, índice parcial, escopo
// por loja). Rodam com `DATABASE_URL` apontando para um servidor descartável:
// `cargo test -- --include-ignored`. O `sqlx::test` cria um banco por teste e
// aplica `migrations/`.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    config::{AppState, Config},
    models::{
        appointment::CreateAppointmentPayload,
        auth::{Role, Session},
        order::{CreateOrderPayload, CreateOrderStatusPayload, OrderLinePayload, UpdateOrderStatusPayload},
        settings::APPOINTMENT_ALLOW_STAFF_CREATE,
    },
    services::auth::hash_reset_token,
};

fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/sqlx-test".to_string()),
        "JWT_SECRET" => Some("segredo-de-teste".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::from_parts(pool, config, None)
}

fn session(user_id: i64, role: Role, business_id: i64) -> Session {
    Session { user_id, phone: format!("55{user_id:06}"), role, business_id }
}

async fn seed_business(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO businesses (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_user(pool: &PgPool, business_id: i64, role: Role, phone: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (business_id, name, phone, email, role) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(business_id)
    .bind(format!("Usuário {phone}"))
    .bind(phone)
    .bind(format!("{phone}@loja.test"))
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_customer(pool: &PgPool, business_id: i64, created_by: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO customers (business_id, created_by_user_id, name) VALUES ($1, $2, 'Cliente') RETURNING id",
    )
    .bind(business_id)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_product(pool: &PgPool, business_id: i64, price_cents: i64, is_active: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (business_id, name, price_cents, is_active) VALUES ($1, 'Produto', $2, $3) RETURNING id",
    )
    .bind(business_id)
    .bind(price_cents)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_created_status(state: &AppState, business_id: i64) {
    state
        .order_status_service
        .create(business_id, status_payload("CREATED", true))
        .await
        .unwrap();
}

fn status_payload(key: &str, is_default: bool) -> CreateOrderStatusPayload {
    CreateOrderStatusPayload {
        key: key.into(),
        label: key.to_lowercase(),
        order_index: 0,
        is_final: false,
        is_default,
    }
}

fn order_payload(customer_id: i64, lines: &[(i64, i64)]) -> CreateOrderPayload {
    CreateOrderPayload {
        customer_id,
        items: lines
            .iter()
            .map(|&(product_id, quantity)| OrderLinePayload { product_id, quantity })
            .collect(),
        source: None,
        notes: None,
    }
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn concurrent_default_statuses_leave_exactly_one(pool: PgPool) {
    let state = state(pool.clone());
    let business = seed_business(&pool, "Loja").await;

    let (a, b) = tokio::join!(
        state.order_status_service.create(business, status_payload("A", true)),
        state.order_status_service.create(business, status_payload("B", true)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let defaults: Vec<_> = state
        .order_status_service
        .list(business)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.is_default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert!(defaults[0].id == a.id || defaults[0].id == b.id);

    let other = if defaults[0].id == a.id { b.id } else { a.id };
    let payload = UpdateOrderStatusPayload {
        key: None,
        label: None,
        order_index: None,
        is_final: None,
        is_default: Some(true),
    };
    state.order_status_service.update(business, other, payload).await.unwrap();

    let defaults: Vec<i64> = state
        .order_status_service
        .list(business)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.is_default)
        .map(|s| s.id)
        .collect();
    assert_eq!(defaults, vec![other]);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn order_with_unusable_product_writes_nothing(pool: PgPool) {
    let state = state(pool.clone());
    let business = seed_business(&pool, "Loja").await;
    let other_business = seed_business(&pool, "Outra").await;
    let admin = seed_user(&pool, business, Role::Admin, "5510001").await;
    let customer = seed_customer(&pool, business, admin).await;
    seed_created_status(&state, business).await;

    let active = seed_product(&pool, business, 1000, true).await;
    let archived = seed_product(&pool, business, 1000, false).await;
    let foreign = seed_product(&pool, other_business, 1000, true).await;
    let admin = session(admin, Role::Admin, business);

    for missing in [archived, foreign] {
        let result = state
            .order_service
            .create(&admin, order_payload(customer, &[(active, 1), (missing, 1)]))
            .await;
        match result {
            Err(AppError::NotFound(message)) => assert!(message.contains(&missing.to_string())),
            other => panic!("esperava NotFound, veio {other:?}"),
        }
    }

    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "order_items").await, 0);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn order_total_survives_price_change(pool: PgPool) {
    let state = state(pool.clone());
    let business = seed_business(&pool, "Loja").await;
    let admin_id = seed_user(&pool, business, Role::Admin, "5510002").await;
    let customer = seed_customer(&pool, business, admin_id).await;
    seed_created_status(&state, business).await;
    let product = seed_product(&pool, business, 1000, true).await;
    let admin = session(admin_id, Role::Admin, business);

    let created = state
        .order_service
        .create(&admin, order_payload(customer, &[(product, 2)]))
        .await
        .unwrap();
    assert_eq!(created.order.total_amount_cents, 2000);

    let cheaper = serde_json::from_value(json!({ "priceCents": "500" })).unwrap();
    let updated = state.catalog_service.update_product(business, product, cheaper).await.unwrap();
    assert_eq!(updated.price_cents, 500);

    let detail = state.order_service.detail(&admin, created.order.id).await.unwrap();
    assert_eq!(detail.order.total_amount_cents, 2000);
    assert_eq!(detail.items[0].unit_price_cents, 1000);
    assert_eq!(detail.items[0].total_amount_cents, 2000);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn expired_and_reused_reset_tokens_fail_like_unknown_ones(pool: PgPool) {
    let state = state(pool.clone());
    let business = seed_business(&pool, "Loja").await;
    let user = seed_user(&pool, business, Role::Customer, "5510003").await;

    let unknown = state
        .auth_service
        .reset_password("token-que-nunca-existiu", "novaSenha123")
        .await
        .unwrap_err()
        .to_string();

    sqlx::query(
        "UPDATE users SET reset_password_token_hash = $2, reset_password_expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1",
    )
    .bind(user)
    .bind(hash_reset_token("token-vencido"))
    .execute(&pool)
    .await
    .unwrap();
    let expired = state
        .auth_service
        .reset_password("token-vencido", "novaSenha123")
        .await
        .unwrap_err();
    assert!(matches!(expired, AppError::BadRequest(_)));
    assert_eq!(expired.to_string(), unknown);

    sqlx::query(
        "UPDATE users SET reset_password_token_hash = $2, reset_password_expires_at = NOW() + INTERVAL '30 minutes' WHERE id = $1",
    )
    .bind(user)
    .bind(hash_reset_token("token-valido"))
    .execute(&pool)
    .await
    .unwrap();
    state.auth_service.reset_password("token-valido", "novaSenha123").await.unwrap();

    let reused = state
        .auth_service
        .reset_password("token-valido", "outraSenha456")
        .await
        .unwrap_err();
    assert_eq!(reused.to_string(), unknown);

    let stored: Option<String> = sqlx::query_scalar("SELECT reset_password_token_hash FROM users WHERE id = $1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(stored.is_none());
    assert!(state.auth_service.login("5510003", "novaSenha123").await.is_ok());
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn rows_of_another_business_are_not_found(pool: PgPool) {
    let state = state(pool.clone());
    let mine = seed_business(&pool, "Minha").await;
    let theirs = seed_business(&pool, "Deles").await;
    let my_admin = seed_user(&pool, mine, Role::Admin, "5510004").await;
    let their_admin_id = seed_user(&pool, theirs, Role::Admin, "5510005").await;

    let their_customer = seed_customer(&pool, theirs, their_admin_id).await;
    seed_created_status(&state, theirs).await;
    let their_product = seed_product(&pool, theirs, 700, true).await;
    let their_admin = session(their_admin_id, Role::Admin, theirs);
    let their_order = state
        .order_service
        .create(&their_admin, order_payload(their_customer, &[(their_product, 1)]))
        .await
        .unwrap();

    let me = session(my_admin, Role::Admin, mine);
    let absent = state.order_service.detail(&me, i64::MAX).await.unwrap_err();
    let foreign = state.order_service.detail(&me, their_order.order.id).await.unwrap_err();
    assert!(matches!(foreign, AppError::NotFound(_)));
    assert_eq!(foreign.to_string(), absent.to_string());

    assert!(matches!(
        state.customer_service.get(&me, their_customer).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        state.catalog_service.get_product(mine, their_product).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL com Postgres"]
async fn staff_appointment_creation_follows_the_store_setting(pool: PgPool) {
    let state = state(pool.clone());
    let business = seed_business(&pool, "Loja").await;
    let staff_id = seed_user(&pool, business, Role::Staff, "5510006").await;
    let customer = seed_customer(&pool, business, staff_id).await;
    let staff = session(staff_id, Role::Staff, business);

    let payload = || CreateAppointmentPayload {
        customer_id: customer,
        staff_user_id: None,
        start_at: chrono::Utc::now() + chrono::Duration::days(1),
        end_at: None,
        service_name: Some("Corte".into()),
        notes: None,
    };

    assert!(matches!(
        state.appointment_service.create(&staff, payload()).await,
        Err(AppError::Forbidden(_))
    ));

    state
        .settings_service
        .set(business, APPOINTMENT_ALLOW_STAFF_CREATE, &json!(true))
        .await
        .unwrap();

    let created = state.appointment_service.create(&staff, payload()).await.unwrap();
    assert_eq!(created.staff_user_id, Some(staff_id));
    assert_eq!(created.created_by_user_id, staff_id);
    assert_eq!(created.end_at - created.start_at, chrono::Duration::minutes(60));
}
