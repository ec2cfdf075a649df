//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{
    auth::auth_guard,
    staff_self::{staff_self_guard, SelfRule},
};
use crate::services::uploads::MAX_UPLOAD_BYTES;

// Folga para os cabeçalhos do multipart além do próprio arquivo
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;
    let addr = app_state.config.bind_addr.clone();

    let app = build_router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    let auth_layer = || axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    // Rotas de autenticação: públicas, exceto o perfil
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .merge(
            Router::new()
                .route(
                    "/profile",
                    get(handlers::auth::get_profile).patch(handlers::auth::update_profile),
                )
                .route("/change-password", post(handlers::auth::change_password))
                .layer(auth_layer()),
        );

    // Tudo aqui exige Bearer válido; o papel é conferido em cada handler
    let protected_routes = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .route_layer(axum_middleware::from_fn_with_state(SelfRule::Id("id"), staff_self_guard))
                .patch(handlers::users::update_user),
        )
        .route(
            "/users/by-phone/{phone}",
            get(handlers::users::get_user_by_phone)
                .route_layer(axum_middleware::from_fn_with_state(SelfRule::Phone("phone"), staff_self_guard)),
        )
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/{id}",
            patch(handlers::categories::update_category).delete(handlers::categories::archive_category),
        )
        .route("/products/manage", get(handlers::products::list_managed_products))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/customers/me", get(handlers::customers::my_customers))
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer)
                .patch(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/order-status",
            get(handlers::order_status::list_statuses).post(handlers::order_status::create_status),
        )
        .route(
            "/order-status/{id}",
            get(handlers::order_status::get_status)
                .patch(handlers::order_status::update_status)
                .delete(handlers::order_status::delete_status),
        )
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/orders/{id}",
            get(handlers::orders::get_order).patch(handlers::orders::update_order),
        )
        .route(
            "/orders/{id}/payments",
            get(handlers::orders::list_payments).post(handlers::orders::add_payment),
        )
        .route(
            "/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(handlers::appointments::get_appointment)
                .patch(handlers::appointments::update_appointment),
        )
        .route(
            "/settings",
            get(handlers::settings::list_settings).post(handlers::settings::upsert_setting),
        )
        .route(
            "/settings/{key}",
            get(handlers::settings::get_setting).post(handlers::settings::set_setting),
        )
        .route(
            "/uploads/product-image",
            post(handlers::uploads::upload_product_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .layer(auth_layer());

    // Mesmo caminho, regras diferentes: GET é vitrine, escrita exige login
    let catalog_routes = Router::new()
        .route(
            "/products",
            post(handlers::products::create_product)
                .route_layer(auth_layer())
                .get(handlers::products::list_products),
        )
        .route(
            "/products/{id}",
            patch(handlers::products::update_product)
                .delete(handlers::products::archive_product)
                .route_layer(auth_layer())
                .get(handlers::products::get_product),
        )
        .route("/public/categories", get(handlers::public::list_categories))
        .route("/public/categories/{slug}", get(handlers::public::get_category));

    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .merge(catalog_routes);

    let uploads_dir = app_state.config.uploads_dir.clone();

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;
    use tower::ServiceExt;

    use crate::config::Config;

    // Pool preguiçoso: nenhuma rota testada aqui chega ao banco
    fn test_router(public_business_id: Option<i64>) -> Router {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/unused"),
            ("JWT_SECRET", "segredo-de-teste"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState::from_parts(pool, config, public_business_id))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = test_router(None)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let (status, body) = send(
            test_router(Some(1)),
            Request::get("/api/orders").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert!(body["errors"].is_array());
    }

    #[tokio::test]
    async fn garbage_bearer_is_unauthorized() {
        let (status, body) = send(
            test_router(Some(1)),
            Request::get("/api/auth/profile")
                .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_authorization_header_still_uses_envelope() {
        let (status, body) = send(
            test_router(Some(1)),
            Request::get("/api/customers")
                .header(header::AUTHORIZATION, "Basic abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn product_writes_require_login_but_share_the_public_path() {
        let (status, _) = send(
            test_router(Some(1)),
            Request::post("/api/products")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn storefront_without_public_business_is_not_found() {
        let (status, body) = send(
            test_router(None),
            Request::get("/api/public/categories").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (status, body) = send(
            test_router(Some(1)),
            Request::get("/api/products/abc").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(
            test_router(None),
            Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/orders"].is_object());
    }
}
