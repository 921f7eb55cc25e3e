// Authentication configuration loaded from environment variables.
// Decision: Default to a 24 hour session lifetime; the cookie max-age always
// matches it

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long a session (and its cookie) stays valid.
    pub session_ttl: Duration,
    /// Whether the session cookie carries the Secure attribute. On by
    /// default in production, off for local HTTP development.
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(24 * 60 * 60),
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// - `SESSION_TTL_HOURS`: session lifetime (default 24)
    /// - `APP_ENV`: `production` turns the Secure cookie attribute on
    /// - `COOKIE_SECURE`: explicit override, `true`/`1`/`false`/`0`
    pub fn from_env() -> Self {
        let session_ttl = std::env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|hours| Duration::from_secs(hours * 60 * 60))
            .unwrap_or_else(|| Duration::from_secs(24 * 60 * 60));

        let is_production = std::env::var("APP_ENV")
            .map(|s| s.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(is_production);

        Self {
            session_ttl,
            cookie_secure,
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl.as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_24_hours() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl_secs(), 24 * 60 * 60);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_ttl_secs_matches_duration() {
        let config = AuthConfig {
            session_ttl: Duration::from_secs(3600),
            cookie_secure: true,
        };
        assert_eq!(config.session_ttl_secs(), 3600);
    }
}
