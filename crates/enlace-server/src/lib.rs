// Enlace server library
// Decision: Router assembly lives here so tests can build the full app
// against the in-memory backend

pub mod api;
pub mod auth;
pub mod config;
pub mod services;
pub mod storage;
pub mod telemetry;

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use enlace_core::{
    CollectionReport, CreatorProfile, Devotional, DevotionalStatus, MonthlyTotal, Payment,
    PaymentStatus, PaymentSummary, ProfileLink, UserPublic, UserRole, UserStatus,
};

use crate::auth::{AuthConfig, AuthState};
use crate::services::CollectorService;
use crate::storage::password::hash_password;
use crate::storage::{CreateUserRow, StorageBackend};

/// Everything the router needs, wired once at startup.
pub struct AppContext {
    pub db: StorageBackend,
    pub auth: AuthState,
    pub profile: Arc<CreatorProfile>,
    pub cron_secret: Option<String>,
}

impl AppContext {
    pub fn new(
        db: StorageBackend,
        auth_config: AuthConfig,
        profile: CreatorProfile,
        cron_secret: Option<String>,
    ) -> Self {
        let auth = AuthState::new(auth_config, db.clone());
        Self {
            db,
            auth,
            profile: Arc::new(profile),
            cron_secret,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::login,
        auth::routes::logout,
        auth::routes::me,
        api::users::list_users,
        api::users::create_user,
        api::users::update_user,
        api::users::delete_user,
        api::devotionals::list_devotionals,
        api::devotionals::create_devotional,
        api::devotionals::update_devotional,
        api::devotionals::delete_devotional,
        api::payments::list_payments,
        api::payments::payments_summary,
        api::payments::create_payment,
        api::payments::update_payment,
        api::payments::delete_payment,
        api::profile::get_profile,
        api::profile::get_current_devotional,
        api::collector::run_collector,
    ),
    components(
        schemas(
            UserPublic, UserRole, UserStatus,
            Devotional, DevotionalStatus,
            Payment, PaymentStatus, PaymentSummary, MonthlyTotal,
            CollectionReport, CreatorProfile, ProfileLink,
            auth::routes::LoginRequest, auth::routes::LoginResponse, auth::routes::MeResponse,
            api::users::CreateUserRequest, api::users::UpdateUserRequest,
            api::devotionals::CreateDevotionalRequest, api::devotionals::UpdateDevotionalRequest,
            api::payments::CreatePaymentRequest, api::payments::UpdatePaymentRequest,
            api::payments::PaymentSummaryResponse,
            api::collector::CollectorRunResponse,
            api::ErrorResponse,
            api::ListResponse<Devotional>,
            api::ListResponse<Payment>,
            api::PagedResponse<UserPublic>,
        )
    ),
    tags(
        (name = "auth", description = "Session endpoints"),
        (name = "users", description = "User management (admin)"),
        (name = "devotionals", description = "Devotional management (admin)"),
        (name = "payments", description = "Payment management (admin)"),
        (name = "profile", description = "Public profile page data"),
        (name = "collector", description = "Payment collection trigger")
    ),
    info(
        title = "Enlace API",
        description = "Creator link-in-bio profile with an admin back-office",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

/// Assemble the application router.
pub fn build_router(ctx: &AppContext) -> Router {
    let users_state = api::users::UsersState {
        db: ctx.db.clone(),
        auth: ctx.auth.clone(),
    };
    let devotionals_state = api::devotionals::DevotionalsState {
        db: ctx.db.clone(),
        auth: ctx.auth.clone(),
    };
    let payments_state = api::payments::PaymentsState {
        db: ctx.db.clone(),
        auth: ctx.auth.clone(),
    };
    let profile_state = api::profile::ProfileState {
        profile: ctx.profile.clone(),
        db: ctx.db.clone(),
    };
    let collector_state = api::collector::CollectorState {
        service: Arc::new(CollectorService::new(ctx.db.clone())),
        cron_secret: ctx.cron_secret.clone(),
    };
    let health_state = HealthState {
        storage: if ctx.db.is_dev_mode() {
            "in-memory"
        } else {
            "postgres"
        },
    };

    Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(auth::routes(ctx.auth.clone()))
        .merge(api::users::routes(users_state))
        .merge(api::devotionals::routes(devotionals_state))
        .merge(api::payments::routes(payments_state))
        .merge(api::profile::routes(profile_state))
        .merge(api::collector::routes(collector_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
}

/// Ensure an admin account exists (dev mode boots with an empty store).
pub async fn seed_admin(db: &StorageBackend, email: &str, password: &str) -> Result<()> {
    if db.get_user_by_email_with_password(email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    db.create_user(CreateUserRow {
        name: "Admin".to_string(),
        email: email.to_string(),
        password_hash,
        role: UserRole::Admin.to_string(),
        status: UserStatus::Active.to_string(),
    })
    .await?;

    tracing::info!(email, "Seeded admin account");
    Ok(())
}
