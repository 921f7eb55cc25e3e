// Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. RUST_LOG wins; the default
/// keeps server and tower-http request logs visible.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("enlace_server=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
