// Public profile routes: the link-in-bio page data
//
// No auth on these; they are what the public page fetches.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use enlace_core::{CreatorProfile, Devotional, ProfileLink};

use super::{api_error, internal_error, ApiError};
use crate::storage::StorageBackend;

/// App state for public profile routes
#[derive(Clone)]
pub struct ProfileState {
    pub profile: Arc<CreatorProfile>,
    pub db: StorageBackend,
}

/// Create public profile routes
pub fn routes(state: ProfileState) -> Router {
    Router::new()
        .route("/v1/profile", get(get_profile))
        .route("/v1/profile/devotional", get(get_current_devotional))
        .with_state(state)
}

/// Load the creator profile from a JSON file. A missing file falls back to
/// the built-in default; malformed JSON is a startup error.
pub fn load_profile(path: &str) -> anyhow::Result<CreatorProfile> {
    if !Path::new(path).exists() {
        tracing::warn!(path, "Profile file not found, using built-in default");
        return Ok(default_profile());
    }
    let raw = std::fs::read_to_string(path)?;
    let profile = serde_json::from_str(&raw)?;
    Ok(profile)
}

fn default_profile() -> CreatorProfile {
    CreatorProfile {
        name: "Enlace".to_string(),
        subtitle: None,
        bio: "Daily devotionals and links".to_string(),
        avatar_url: None,
        links: vec![ProfileLink {
            label: "Devotional of the day".to_string(),
            url: "/v1/profile/devotional".to_string(),
            icon: Some("flame".to_string()),
        }],
    }
}

/// GET /v1/profile - Creator profile and links
#[utoipa::path(
    get,
    path = "/v1/profile",
    responses((status = 200, description = "Creator profile", body = CreatorProfile)),
    tag = "profile"
)]
pub async fn get_profile(State(state): State<ProfileState>) -> Json<CreatorProfile> {
    Json((*state.profile).clone())
}

/// GET /v1/profile/devotional - Latest published devotional up to today
#[utoipa::path(
    get,
    path = "/v1/profile/devotional",
    responses(
        (status = 200, description = "Current devotional", body = Devotional),
        (status = 404, description = "Nothing published yet")
    ),
    tag = "profile"
)]
pub async fn get_current_devotional(
    State(state): State<ProfileState>,
) -> Result<Json<Devotional>, ApiError> {
    let today = Utc::now().date_naive();
    let row = state
        .db
        .latest_published_devotional(today)
        .await
        .map_err(|e| internal_error("Loading devotional", e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No devotional published yet"))?;

    let devotional = row
        .into_dto()
        .map_err(|e| internal_error("Loading devotional", e))?;

    Ok(Json(devotional))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_file_falls_back_to_default() {
        let profile = load_profile("/nonexistent/profile.json").unwrap();
        assert_eq!(profile.name, "Enlace");
        assert!(!profile.links.is_empty());
    }

    #[test]
    fn test_malformed_profile_file_is_an_error() {
        let dir = std::env::temp_dir();
        let path = dir.join("enlace-profile-malformed.json");
        std::fs::write(&path, "{not json").unwrap();
        let result = load_profile(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_profile_file_is_parsed() {
        let dir = std::env::temp_dir();
        let path = dir.join("enlace-profile-valid.json");
        std::fs::write(
            &path,
            r#"{"name": "Ana", "bio": "Words", "links": [{"label": "Site", "url": "https://example.com"}]}"#,
        )
        .unwrap();
        let profile = load_profile(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.links.len(), 1);
    }
}
