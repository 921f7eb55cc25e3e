// Storage layer for the Enlace server
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;

/// True when a storage error came from the unique email constraint, so the
/// API layer can answer 409 instead of 500.
pub fn is_duplicate_email(err: &anyhow::Error) -> bool {
    if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
        return db_err.is_unique_violation();
    }
    err.to_string().contains("duplicate email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_duplicate_email_detection_for_memory_backend() {
        assert!(is_duplicate_email(&anyhow!("duplicate email: a@x.com")));
        assert!(!is_duplicate_email(&anyhow!("connection reset")));
    }
}
