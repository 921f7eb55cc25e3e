// Cookie-session authentication: session store, gateway, login/logout.

pub mod config;
pub mod middleware;
pub mod routes;
pub mod session;

pub use config::AuthConfig;
pub use middleware::{
    authenticate, AdminUser, AuthContext, AuthError, AuthState, CurrentUser, FromRef,
    SESSION_COOKIE,
};
pub use routes::routes;
pub use session::{Session, SessionStore};
