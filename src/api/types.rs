use serde::{Deserialize, Deserializer, Serialize};

use crate::feed::FeedEntry;

/// One entry of the recommendation feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
}

impl FeedEntry for Post {
    fn entry_id(&self) -> &str {
        &self.id
    }
}

/// The service hands out ids as either JSON strings or integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// The logged-in user as returned by login/registration and persisted
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub skin_tone: String,
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub style_preference: String,
    #[serde(default)]
    pub additional_info: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Registration payload. Physical attributes feed the recommendation engine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub skin_tone: String,
    pub body_type: String,
    pub weight: f64,
    pub height: f64,
    pub age: u32,
    pub style_preference: String,
    pub additional_info: String,
}

impl Registration {
    /// Checks the fields the service refuses to work without.
    pub fn validate(&self) -> Result<(), String> {
        let missing: Vec<&str> = [
            ("username", self.username.trim().is_empty()),
            ("email", self.email.trim().is_empty()),
            ("password", self.password.is_empty()),
            ("skin tone", self.skin_tone.trim().is_empty()),
            ("body type", self.body_type.trim().is_empty()),
            ("weight", self.weight <= 0.0),
            ("height", self.height <= 0.0),
            ("age", self.age == 0),
        ]
        .into_iter()
        .filter_map(|(name, bad)| bad.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required fields: {}", missing.join(", ")))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.product_type.is_none() && self.model.is_none() && self.color.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub user_id: &'a str,
    pub filters: &'a SearchFilters,
    pub page: usize,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub user_id: &'a str,
    pub location: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TryOnRequest<'a> {
    pub user_image: String,
    pub product_id: &'a str,
}

/// A page of generated recommendations. Individual recommendations are
/// passed through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationPage {
    #[serde(default)]
    pub user_analysis: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default = "first_page")]
    pub current_page: usize,
}

const fn first_page() -> usize {
    1
}

/// Error body the service sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "detail", alias = "error")]
    pub message: String,
}
