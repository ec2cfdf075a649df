// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AppointmentRepository, BusinessRepository, CategoryRepository, CustomerRepository, OrderRepository,
        OrderStatusRepository, ProductRepository, SettingsRepository, UserRepository,
    },
    services::{
        appointment_service::AppointmentService,
        auth::{AuthService, AuthSettings},
        catalog_service::CatalogService,
        customer_service::CustomerService,
        mailer::LogMailer,
        order_service::OrderService,
        order_status_service::OrderStatusService,
        settings_service::SettingsService,
        uploads::UploadService,
        user_service::UserService,
    },
};

/// Tudo que vem do ambiente, lido uma vez na subida.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: i64,
    pub public_business_id: Option<i64>,
    pub site_name: String,
    pub site_url: String,
    pub uploads_dir: String,
    pub api_base_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Variáveis vazias contam como ausentes
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        let jwt_expires_in_seconds = match get("JWT_EXPIRES_IN_SECONDS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|s| *s > 0)
                .with_context(|| format!("JWT_EXPIRES_IN_SECONDS inválido: {raw}"))?,
            None => 86_400,
        };

        let public_business_id = match get("PUBLIC_BUSINESS_ID") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .with_context(|| format!("PUBLIC_BUSINESS_ID inválido: {raw}"))?,
            ),
            None => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: get("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_expires_in_seconds,
            public_business_id,
            site_name: first(&["BUSINESS_NAME", "SITE_NAME"]).unwrap_or_else(|| "Store".into()),
            site_url: first(&["SITE_URL", "NEXT_PUBLIC_SITE_URL"])
                .unwrap_or_else(|| "http://localhost:3000".into()),
            uploads_dir: get("UPLOADS_DIR").unwrap_or_else(|| "uploads".into()),
            api_base_url: get("API_BASE_URL").unwrap_or_else(|| "http://localhost:4000".into()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:4000".into()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    /// Loja da vitrine pública, resolvida uma vez na subida
    pub public_business_id: Option<i64>,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub settings_service: SettingsService,
    pub catalog_service: CatalogService,
    pub customer_service: CustomerService,
    pub order_status_service: OrderStatusService,
    pub order_service: OrderService,
    pub appointment_service: AppointmentService,
    pub upload_service: UploadService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let public_business_id =
            resolve_public_business(&BusinessRepository::new(db_pool.clone()), config.public_business_id).await?;

        Ok(Self::from_parts(db_pool, config, public_business_id))
    }

    /// Monta o grafo de dependências sem tocar no banco.
    pub fn from_parts(db_pool: PgPool, config: Config, public_business_id: Option<i64>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let business_repo = BusinessRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let status_repo = OrderStatusRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());

        let settings_service = SettingsService::new(SettingsRepository::new(db_pool.clone()), db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            business_repo,
            Arc::new(LogMailer),
            AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                jwt_expires_in_seconds: config.jwt_expires_in_seconds,
                site_url: config.site_url.clone(),
                site_name: config.site_name.clone(),
                public_business_id,
            },
        );

        let catalog_service = CatalogService::new(
            CategoryRepository::new(db_pool.clone()),
            product_repo.clone(),
            db_pool.clone(),
        );
        let order_service = OrderService::new(
            OrderRepository::new(db_pool.clone()),
            status_repo.clone(),
            customer_repo.clone(),
            product_repo,
            settings_service.clone(),
            db_pool.clone(),
        );
        let appointment_service = AppointmentService::new(
            AppointmentRepository::new(db_pool.clone()),
            customer_repo.clone(),
            user_repo.clone(),
            settings_service.clone(),
            db_pool.clone(),
        );

        Self {
            user_service: UserService::new(user_repo),
            customer_service: CustomerService::new(customer_repo, db_pool.clone()),
            order_status_service: OrderStatusService::new(status_repo, db_pool.clone()),
            upload_service: UploadService::new(&config.uploads_dir, config.api_base_url.clone()),
            auth_service,
            settings_service,
            catalog_service,
            order_service,
            appointment_service,
            public_business_id,
            config: Arc::new(config),
            db_pool,
        }
    }
}

// id do ambiente, se existir no banco; senão a loja de menor id
async fn resolve_public_business(repo: &BusinessRepository, configured: Option<i64>) -> anyhow::Result<Option<i64>> {
    if let Some(id) = configured {
        if repo.find_by_id(id).await?.is_some() {
            tracing::info!(business_id = id, "🏪 Vitrine pública configurada");
            return Ok(Some(id));
        }
        tracing::warn!(business_id = id, "PUBLIC_BUSINESS_ID não existe; usando a primeira loja");
    }

    let fallback = repo.find_first().await?.map(|b| b.id);
    match fallback {
        Some(id) => tracing::info!(business_id = id, "🏪 Vitrine pública na primeira loja"),
        None => tracing::warn!("Nenhuma loja cadastrada: rotas públicas responderão 404"),
    }
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = config_from(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(config.jwt_expires_in_seconds, 86_400);
        assert_eq!(config.public_business_id, None);
        assert_eq!(config.site_name, "Store");
        assert_eq!(config.uploads_dir, "uploads");
        assert_eq!(config.api_base_url, "http://localhost:4000");
        assert_eq!(config.bind_addr, "0.0.0.0:4000");
    }

    #[test]
    fn aliases_are_honored_in_order() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("SITE_NAME", "Loja do Site"),
            ("NEXT_PUBLIC_SITE_URL", "https://loja.com"),
            ("PUBLIC_BUSINESS_ID", "7"),
        ])
        .unwrap();
        assert_eq!(config.site_name, "Loja do Site");
        assert_eq!(config.site_url, "https://loja.com");
        assert_eq!(config.public_business_id, Some(7));
    }

    #[test]
    fn required_and_malformed_vars_fail() {
        assert!(config_from(&[("JWT_SECRET", "s")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "  ")]).is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("JWT_EXPIRES_IN_SECONDS", "amanhã"),
        ])
        .is_err());
    }
}
