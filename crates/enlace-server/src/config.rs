// Server configuration loaded from environment variables.
// Decision: Unset DATABASE_URL selects the in-memory dev backend instead of
// failing startup

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// PostgreSQL connection string; unset means in-memory dev mode.
    pub database_url: Option<String>,
    /// Shared secret authorizing the collector trigger; unset disables it.
    pub cron_secret: Option<String>,
    /// Path to the creator profile JSON file.
    pub profile_path: String,
    /// Seed admin credentials for dev mode (the in-memory store starts
    /// empty on every boot).
    pub admin_email: String,
    pub admin_password: String,
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:9000".to_string()),
            database_url: env_non_empty("DATABASE_URL"),
            cron_secret: env_non_empty("CRON_SECRET"),
            profile_path: env_non_empty("PROFILE_PATH").unwrap_or_else(|| "profile.json".to_string()),
            admin_email: env_non_empty("ADMIN_EMAIL").unwrap_or_else(|| "admin@enlace.local".to_string()),
            admin_password: env_non_empty("ADMIN_PASSWORD").unwrap_or_else(|| "change-me".to_string()),
        }
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == "change-me"
    }
}
