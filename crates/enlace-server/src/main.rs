// Enlace API server
// Decision: In-memory storage with a seeded admin when DATABASE_URL is
// unset, so local development needs no database

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use enlace_server::auth::AuthConfig;
use enlace_server::config::ServerConfig;
use enlace_server::storage::StorageBackend;
use enlace_server::{api, build_router, seed_admin, telemetry, AppContext};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    tracing::info!("enlace-server starting...");

    let config = ServerConfig::from_env();

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage (dev mode)");
            let db = StorageBackend::in_memory();
            seed_admin(&db, &config.admin_email, &config.admin_password)
                .await
                .context("Failed to seed admin account")?;
            if config.uses_default_admin_password() {
                tracing::warn!(
                    email = %config.admin_email,
                    "Dev admin uses the default password; set ADMIN_PASSWORD to change it"
                );
            }
            db
        }
    };

    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET not set; the collector trigger is disabled");
    }

    let auth_config = AuthConfig::from_env();
    tracing::info!(
        session_ttl_secs = auth_config.session_ttl_secs(),
        cookie_secure = auth_config.cookie_secure,
        "Authentication configured"
    );

    let profile = api::profile::load_profile(&config.profile_path)
        .context("Failed to load creator profile")?;

    let ctx = AppContext::new(db, auth_config, profile, config.cron_secret.clone());
    let app = build_router(&ctx);

    // CORS only when the page is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                .allow_credentials(true),
        )
    };

    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
