// Creator profile DTOs (the link-in-bio page data)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single entry on the link-in-bio page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
    /// Icon name the page maps to a glyph. Free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The creator profile served to the public page. Rendering is the page's
/// concern; the server only hands over this data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatorProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_without_links() {
        let profile: CreatorProfile =
            serde_json::from_str(r#"{"name": "Ana", "bio": "Daily words"}"#).unwrap();
        assert_eq!(profile.name, "Ana");
        assert!(profile.links.is_empty());
        assert!(profile.subtitle.is_none());
    }

    #[test]
    fn test_optional_fields_omitted() {
        let profile = CreatorProfile {
            name: "Ana".to_string(),
            subtitle: None,
            bio: "Daily words".to_string(),
            avatar_url: None,
            links: vec![ProfileLink {
                label: "Instagram".to_string(),
                url: "https://instagram.com/ana".to_string(),
                icon: None,
            }],
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("subtitle").is_none());
        assert!(json.get("avatar_url").is_none());
        assert_eq!(json["links"][0]["label"], "Instagram");
    }
}
