// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// The server runs against PostgreSQL in production and against the
// in-memory store in dev mode and tests. Every call site goes through this
// enum so the choice is made once, at startup.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory store (dev mode)
    InMemory(std::sync::Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and run migrations.
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(std::sync::Arc::new(InMemoryDatabase::new()))
    }

    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email_with_password(&self, email: &str) -> Result<Option<UserAuthRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email_with_password(email).await,
            Self::InMemory(db) => db.get_user_by_email_with_password(email).await,
        }
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>> {
        match self {
            Self::Postgres(db) => db.list_users(filter, limit, offset).await,
            Self::InMemory(db) => db.list_users(filter, limit, offset).await,
        }
    }

    pub async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        match self {
            Self::Postgres(db) => db.count_users(filter).await,
            Self::InMemory(db) => db.count_users(filter).await,
        }
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserRow) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.update_user_password(id, password_hash).await,
            Self::InMemory(db) => db.update_user_password(id, password_hash).await,
        }
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_user(id).await,
            Self::InMemory(db) => db.delete_user(id).await,
        }
    }

    // ============================================
    // Devotionals
    // ============================================

    pub async fn create_devotional(&self, input: CreateDevotionalRow) -> Result<DevotionalRow> {
        match self {
            Self::Postgres(db) => db.create_devotional(input).await,
            Self::InMemory(db) => db.create_devotional(input).await,
        }
    }

    pub async fn get_devotional(&self, id: Uuid) -> Result<Option<DevotionalRow>> {
        match self {
            Self::Postgres(db) => db.get_devotional(id).await,
            Self::InMemory(db) => db.get_devotional(id).await,
        }
    }

    pub async fn list_devotionals(&self, filter: &DevotionalFilter) -> Result<Vec<DevotionalRow>> {
        match self {
            Self::Postgres(db) => db.list_devotionals(filter).await,
            Self::InMemory(db) => db.list_devotionals(filter).await,
        }
    }

    pub async fn update_devotional(
        &self,
        id: Uuid,
        input: UpdateDevotionalRow,
    ) -> Result<Option<DevotionalRow>> {
        match self {
            Self::Postgres(db) => db.update_devotional(id, input).await,
            Self::InMemory(db) => db.update_devotional(id, input).await,
        }
    }

    pub async fn soft_delete_devotional(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.soft_delete_devotional(id).await,
            Self::InMemory(db) => db.soft_delete_devotional(id).await,
        }
    }

    pub async fn restore_devotional(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.restore_devotional(id).await,
            Self::InMemory(db) => db.restore_devotional(id).await,
        }
    }

    pub async fn latest_published_devotional(
        &self,
        on_or_before: NaiveDate,
    ) -> Result<Option<DevotionalRow>> {
        match self {
            Self::Postgres(db) => db.latest_published_devotional(on_or_before).await,
            Self::InMemory(db) => db.latest_published_devotional(on_or_before).await,
        }
    }

    // ============================================
    // Payments
    // ============================================

    pub async fn create_payment(&self, input: CreatePaymentRow) -> Result<PaymentRow> {
        match self {
            Self::Postgres(db) => db.create_payment(input).await,
            Self::InMemory(db) => db.create_payment(input).await,
        }
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Option<PaymentRow>> {
        match self {
            Self::Postgres(db) => db.get_payment(id).await,
            Self::InMemory(db) => db.get_payment(id).await,
        }
    }

    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<PaymentRow>> {
        match self {
            Self::Postgres(db) => db.list_payments(filter).await,
            Self::InMemory(db) => db.list_payments(filter).await,
        }
    }

    pub async fn update_payment(
        &self,
        id: Uuid,
        input: UpdatePaymentRow,
    ) -> Result<Option<PaymentRow>> {
        match self {
            Self::Postgres(db) => db.update_payment(id, input).await,
            Self::InMemory(db) => db.update_payment(id, input).await,
        }
    }

    pub async fn delete_payment(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_payment(id).await,
            Self::InMemory(db) => db.delete_payment(id).await,
        }
    }

    pub async fn payments_summary(&self) -> Result<enlace_core::PaymentSummary> {
        match self {
            Self::Postgres(db) => db.payments_summary().await,
            Self::InMemory(db) => db.payments_summary().await,
        }
    }

    pub async fn payments_by_month(&self) -> Result<Vec<enlace_core::MonthlyTotal>> {
        match self {
            Self::Postgres(db) => db.payments_by_month().await,
            Self::InMemory(db) => db.payments_by_month().await,
        }
    }
}
