// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

/// User row as returned by every ordinary fetch path. The password hash is
/// omitted at the SQL level; only `UserAuthRow` carries it.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row including the stored password hash. Returned only by
/// `get_user_by_email_with_password`, consumed only by the login flow.
#[derive(Debug, Clone, FromRow)]
pub struct UserAuthRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAuthRow {
    /// Strip the hash once credential verification is done.
    pub fn into_public_row(self) -> UserRow {
        UserRow {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring match against name or email.
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

// ============================================
// Devotionals
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct DevotionalRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub devotional_date: NaiveDate,
    pub status: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDevotionalRow {
    pub title: String,
    pub content: String,
    pub devotional_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDevotionalRow {
    pub title: Option<String>,
    pub content: Option<String>,
    pub devotional_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DevotionalFilter {
    pub status: Option<String>,
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
    pub include_deleted: bool,
}

// ============================================
// Payments
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub recorder_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentRow {
    pub recorder_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentRow {
    pub recorder_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub recorder_id: Option<String>,
}

// ============================================
// Row -> DTO conversions
// ============================================

impl UserRow {
    /// Project the row into the public DTO. The role/status columns are
    /// CHECK-constrained, so a parse failure means a corrupted row.
    pub fn into_public(self) -> anyhow::Result<enlace_core::UserPublic> {
        Ok(enlace_core::UserPublic {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role.parse().map_err(anyhow::Error::msg)?,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl DevotionalRow {
    pub fn into_dto(self) -> anyhow::Result<enlace_core::Devotional> {
        Ok(enlace_core::Devotional {
            id: self.id,
            title: self.title,
            content: self.content,
            devotional_date: self.devotional_date,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PaymentRow {
    pub fn into_dto(self) -> anyhow::Result<enlace_core::Payment> {
        Ok(enlace_core::Payment {
            id: self.id,
            recorder_id: self.recorder_id,
            amount: self.amount,
            date: self.date,
            description: self.description,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
