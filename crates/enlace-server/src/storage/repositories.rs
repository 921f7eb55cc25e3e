// Repository layer for PostgreSQL
//
// Queries are written as runtime `query_as` calls; filters use the
// `($n IS NULL OR ...)` shape so one statement serves all filter
// combinations.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Aggregate row backing the payments summary.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_completed: f64,
    total_pending: f64,
    total_cancelled: f64,
    total_amount: f64,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MonthlyRow {
    month: String,
    total: f64,
    count: i64,
}

const USER_COLUMNS: &str = "id, name, email, role, status, created_at, updated_at";
const DEVOTIONAL_COLUMNS: &str =
    "id, title, content, devotional_date, status, deleted_at, created_at, updated_at";
const PAYMENT_COLUMNS: &str =
    "id, recorder_id, amount, date, description, status, created_at, updated_at";

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL and run pending migrations.
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.role)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// The one query path that selects the password hash. Everything else
    /// goes through the hash-free column list.
    pub async fn get_user_by_email_with_password(&self, email: &str) -> Result<Option<UserAuthRow>> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r#"
            SELECT id, name, email, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR role = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(&filter.search)
        .bind(&filter.role)
        .bind(&filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR role = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(&filter.search)
        .bind(&filter.role)
        .bind(&filter.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserRow) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2::text, name),
                email = COALESCE($3::text, email),
                role = COALESCE($4::text, role),
                status = COALESCE($5::text, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.role)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Devotionals
    // ============================================

    pub async fn create_devotional(&self, input: CreateDevotionalRow) -> Result<DevotionalRow> {
        let row = sqlx::query_as::<_, DevotionalRow>(&format!(
            r#"
            INSERT INTO devotionals (id, title, content, devotional_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {DEVOTIONAL_COLUMNS}
            "#,
        ))
        .bind(Uuid::now_v7())
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.devotional_date)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_devotional(&self, id: Uuid) -> Result<Option<DevotionalRow>> {
        let row = sqlx::query_as::<_, DevotionalRow>(&format!(
            "SELECT {DEVOTIONAL_COLUMNS} FROM devotionals WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_devotionals(&self, filter: &DevotionalFilter) -> Result<Vec<DevotionalRow>> {
        let rows = sqlx::query_as::<_, DevotionalRow>(&format!(
            r#"
            SELECT {DEVOTIONAL_COLUMNS}
            FROM devotionals
            WHERE ($1::bool OR deleted_at IS NULL)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            ORDER BY devotional_date DESC
            "#,
        ))
        .bind(filter.include_deleted)
        .bind(&filter.status)
        .bind(&filter.search)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_devotional(
        &self,
        id: Uuid,
        input: UpdateDevotionalRow,
    ) -> Result<Option<DevotionalRow>> {
        let row = sqlx::query_as::<_, DevotionalRow>(&format!(
            r#"
            UPDATE devotionals
            SET title = COALESCE($2::text, title),
                content = COALESCE($3::text, content),
                devotional_date = COALESCE($4::date, devotional_date),
                status = COALESCE($5::text, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DEVOTIONAL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.devotional_date)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Soft delete; returns false when the row is missing or already deleted.
    pub async fn soft_delete_devotional(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE devotionals SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn restore_devotional(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE devotionals SET deleted_at = NULL, updated_at = NOW() WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Latest published devotional dated on or before the given day.
    pub async fn latest_published_devotional(
        &self,
        on_or_before: NaiveDate,
    ) -> Result<Option<DevotionalRow>> {
        let row = sqlx::query_as::<_, DevotionalRow>(&format!(
            r#"
            SELECT {DEVOTIONAL_COLUMNS}
            FROM devotionals
            WHERE status = 'published' AND deleted_at IS NULL AND devotional_date <= $1
            ORDER BY devotional_date DESC
            LIMIT 1
            "#,
        ))
        .bind(on_or_before)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Payments
    // ============================================

    pub async fn create_payment(&self, input: CreatePaymentRow) -> Result<PaymentRow> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            INSERT INTO payments (id, recorder_id, amount, date, description, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(Uuid::now_v7())
        .bind(&input.recorder_id)
        .bind(input.amount)
        .bind(input.date)
        .bind(&input.description)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Option<PaymentRow>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<PaymentRow>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::text IS NULL OR recorder_id = $4)
            ORDER BY date DESC, created_at DESC
            "#,
        ))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&filter.status)
        .bind(&filter.recorder_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_payment(
        &self,
        id: Uuid,
        input: UpdatePaymentRow,
    ) -> Result<Option<PaymentRow>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            UPDATE payments
            SET recorder_id = COALESCE($2::text, recorder_id),
                amount = COALESCE($3::float8, amount),
                date = COALESCE($4::date, date),
                description = COALESCE($5::text, description),
                status = COALESCE($6::text, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.recorder_id)
        .bind(input.amount)
        .bind(input.date)
        .bind(&input.description)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_payment(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn payments_summary(&self) -> Result<enlace_core::PaymentSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT COALESCE(SUM(amount) FILTER (WHERE status = 'completed'), 0)::float8 AS total_completed,
                   COALESCE(SUM(amount) FILTER (WHERE status = 'pending'), 0)::float8 AS total_pending,
                   COALESCE(SUM(amount) FILTER (WHERE status = 'cancelled'), 0)::float8 AS total_cancelled,
                   COALESCE(SUM(amount), 0)::float8 AS total_amount,
                   COUNT(*) AS count
            FROM payments
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(enlace_core::PaymentSummary {
            total_completed: row.total_completed,
            total_pending: row.total_pending,
            total_cancelled: row.total_cancelled,
            total_amount: row.total_amount,
            count: row.count as u64,
        })
    }

    pub async fn payments_by_month(&self) -> Result<Vec<enlace_core::MonthlyTotal>> {
        let rows = sqlx::query_as::<_, MonthlyRow>(
            r#"
            SELECT to_char(date, 'YYYY-MM') AS month,
                   SUM(amount)::float8 AS total,
                   COUNT(*) AS count
            FROM payments
            GROUP BY 1
            ORDER BY 1 DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| enlace_core::MonthlyTotal {
                month: r.month,
                total: r.total,
                count: r.count as u64,
            })
            .collect())
    }
}
