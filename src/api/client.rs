use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::ApiError;
use super::types::{
    ErrorBody, GenerateRequest, LoginRequest, Post, RecommendationPage, Registration,
    SearchFilters, SearchRequest, TryOnRequest, UserProfile,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// HTTP client for the recommendation service.
///
/// Every endpoint follows the same pattern: JSON or multipart body in,
/// non-2xx is a failure, JSON body parsed on success.
#[derive(Clone)]
pub struct StyleClient {
    http: reqwest::Client,
    base_url: String,
}

impl StyleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stylefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches one page of the personalised feed. An empty page means the
    /// feed has nothing more to give.
    #[instrument(skip(self, user_id), level = "debug")]
    pub async fn fetch_feed_page(
        &self,
        user_id: &str,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Post>, ApiError> {
        let req = self
            .http
            .get(self.url("/feed"))
            .query(&[("page", page), ("limit", limit)])
            .bearer_auth(user_id);
        self.send(req).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let req = self
            .http
            .post(self.url("/user/login"))
            .json(&LoginRequest { username, password });
        self.send(req).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let req = self.http.post(self.url("/register/")).json(registration);
        self.send(req).await
    }

    pub async fn analyze_profile_picture(
        &self,
        user_id: &str,
        file_name: &str,
        image: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(image_mime(Path::new(file_name)))?;
        let form = Form::new()
            .text("user_id", user_id.to_string())
            .part("profile_picture", part);
        let req = self
            .http
            .post(self.url("/analyze-profile-picture/"))
            .multipart(form);
        self.send(req).await
    }

    /// Returns cached recommendations, or `None` when nothing has been
    /// generated for this user yet.
    pub async fn recommendations(
        &self,
        user_id: &str,
        page: usize,
    ) -> Result<Option<RecommendationPage>, ApiError> {
        let req = self
            .http
            .get(self.url("/ai_recommendations/feed"))
            .query(&[("user_id", user_id.to_string()), ("page", page.to_string())]);
        match self.send(req).await {
            Ok(page) => Ok(Some(page)),
            Err(ApiError::HttpStatus(404, _)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn generate_recommendations(
        &self,
        user_id: &str,
        location: &str,
    ) -> Result<Value, ApiError> {
        let req = self
            .http
            .post(self.url("/ai_recommendations/feed/"))
            .json(&GenerateRequest { user_id, location });
        self.send(req).await
    }

    pub async fn advanced_search(
        &self,
        user_id: &str,
        filters: &SearchFilters,
        page: usize,
    ) -> Result<Value, ApiError> {
        let req = self.http.post(self.url("/advanced-search/")).json(&SearchRequest {
            user_id,
            filters,
            page,
        });
        self.send(req).await
    }

    pub async fn virtual_try_on(
        &self,
        file_name: &str,
        image: &[u8],
        product_id: &str,
    ) -> Result<Value, ApiError> {
        let user_image = format!(
            "data:{};base64,{}",
            image_mime(Path::new(file_name)),
            STANDARD.encode(image)
        );
        let req = self
            .http
            .post(self.url("/virtual_tryons/try_on"))
            .json(&TryOnRequest {
                user_image,
                product_id,
            });
        self.send(req).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = req.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "response");

        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> ApiError {
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
    ApiError::HttpStatus(status.as_u16(), message)
}

/// Content type for an uploaded image, by extension.
pub fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
