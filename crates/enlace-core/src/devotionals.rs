// Devotional DTOs for the public API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Publication state of a devotional. Drafts are only visible in the admin
/// back-office; the public profile serves published entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DevotionalStatus {
    Draft,
    Published,
}

impl std::fmt::Display for DevotionalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DevotionalStatus::Draft => write!(f, "draft"),
            DevotionalStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for DevotionalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DevotionalStatus::Draft),
            "published" => Ok(DevotionalStatus::Published),
            _ => Err(format!("Unknown devotional status: {}", s)),
        }
    }
}

/// A devotional post. `deleted_at` marks soft deletion; soft-deleted entries
/// stay in storage and can be restored from the admin back-office.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Devotional {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Calendar date the devotional is written for (not the creation time).
    pub devotional_date: NaiveDate,
    pub status: DevotionalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Devotional {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            DevotionalStatus::from_str("published").unwrap(),
            DevotionalStatus::Published
        );
        assert_eq!(DevotionalStatus::Draft.to_string(), "draft");
        assert!(DevotionalStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_deleted_at_omitted_when_live() {
        let devotional = Devotional {
            id: Uuid::nil(),
            title: "Morning".to_string(),
            content: "Text".to_string(),
            devotional_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            status: DevotionalStatus::Draft,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&devotional).unwrap();
        assert!(json.get("deleted_at").is_none());
        assert!(!devotional.is_deleted());
    }
}
