//! API client for communicating with the produce-trading REST backend.
//!
//! This module provides the `ApiClient` struct for authenticating and
//! for fetching user recapitulations and catalog (LOV) items.

use std::path::Path;

use reqwest::{multipart, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::models::{Envelope, LovItem, LovItemDraft, UserRecap};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the backend. Overridable via config for staging
/// deployments.
pub const DEFAULT_BASE_URL: &str = "https://sayur-one.vercel.app";

/// HTTP request timeout in seconds.
/// 30s allows for slow cold-started serverless responses while failing
/// fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Payload of a successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub email: String,
}

/// API client for the produce-trading backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (after logout or forced expiry).
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a session token.
    ///
    /// The backend signals rejection both through non-success HTTP statuses
    /// and through a falsy envelope `status` in a 200 body, so the body is
    /// parsed before the HTTP status is consulted - a parseable envelope
    /// carries the authoritative message either way.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let url = self.url("/login");
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, "Login response received");

        match serde_json::from_str::<Envelope<LoginData>>(&text) {
            Ok(envelope) => envelope.into_data().map_err(ApiError::Rejected),
            Err(_) if !status.is_success() => Err(ApiError::from_status(status, &text)),
            Err(e) => Err(ApiError::InvalidResponse(format!(
                "Failed to parse login response: {}",
                e
            ))),
        }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch all users with their recapitulated income/expense transactions.
    pub async fn fetch_user_recaps(&self) -> Result<Vec<UserRecap>, ApiError> {
        let text = self.get_text("/rekaptulasi/user-inputs").await?;
        Self::parse_user_recaps(&text)
    }

    /// Parse the user recap response. The endpoint normally wraps the list in
    /// the standard envelope, but older deployments returned a bare `data`
    /// object without a `status` flag, so try both.
    fn parse_user_recaps(text: &str) -> Result<Vec<UserRecap>, ApiError> {
        if let Ok(envelope) = serde_json::from_str::<Envelope<Vec<UserRecap>>>(text) {
            return envelope.into_data().map_err(ApiError::Rejected);
        }

        #[derive(Deserialize)]
        struct BareData {
            #[serde(default)]
            data: Vec<UserRecap>,
        }

        serde_json::from_str::<BareData>(text)
            .map(|wrapper| wrapper.data)
            .map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse user recap response: {}", e))
            })
    }

    // =========================================================================
    // Catalog (LOV) items
    // =========================================================================

    /// Fetch the reference catalog.
    pub async fn fetch_lov_items(&self) -> Result<Vec<LovItem>, ApiError> {
        self.get_envelope("/lov-items").await
    }

    /// Create a new catalog entry.
    pub async fn create_lov_item(&self, draft: &LovItemDraft) -> Result<(), ApiError> {
        let url = self.url("/lov-items");
        let form = Self::build_lov_form(draft)?;
        let request = self.client.post(&url);
        self.send_lov_mutation(request.multipart(form)).await
    }

    /// Update an existing catalog entry.
    pub async fn update_lov_item(&self, id: i64, draft: &LovItemDraft) -> Result<(), ApiError> {
        let url = self.url(&format!("/lov-items/{}", id));
        let form = Self::build_lov_form(draft)?;
        let request = self.client.put(&url);
        self.send_lov_mutation(request.multipart(form)).await
    }

    /// Delete a catalog entry.
    pub async fn delete_lov_item(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/lov-items/{}", id));
        let request = self.client.delete(&url);
        self.send_lov_mutation(request).await
    }

    /// Build the multipart form for a catalog create/update. The photo is
    /// read eagerly so a bad path fails before anything hits the wire.
    fn build_lov_form(draft: &LovItemDraft) -> Result<multipart::Form, ApiError> {
        let item_type = draft
            .item_type
            .ok_or_else(|| ApiError::InvalidResponse("Catalog entry type not set".to_string()))?;

        let mut form = multipart::Form::new()
            .text("name", draft.name.trim().to_string())
            .text("type", item_type.as_str());

        if let Some(ref path) = draft.photo {
            form = form.part("photo", Self::photo_part(path)?);
        }

        Ok(form)
    }

    fn photo_part(path: &Path) -> Result<multipart::Part, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to read photo {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(multipart::Part::bytes(bytes).file_name(file_name))
    }

    async fn send_lov_mutation(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        let request = self.with_auth(request)?;
        let response = request.send().await?;
        let response = Self::check_response(response).await?;

        let envelope: Envelope<serde_json::Value> = response.json().await?;
        envelope.into_data().map(|_| ()).map_err(ApiError::Rejected)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn with_auth(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token {
            Some(ref token) => Ok(request.bearer_auth(token)),
            None => Err(ApiError::Unauthorized),
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        let request = self.with_auth(self.client.get(&url))?;
        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.get_text(path).await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })?;
        envelope.into_data().map_err(ApiError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_envelope() {
        // LoginData deliberately has no Default impl; the envelope must
        // still deserialize around it
        let json = r#"{"status": true, "data": {"token": "a.b.c", "email": "admin@example.com"}}"#;
        let envelope: Envelope<LoginData> = serde_json::from_str(json).unwrap();
        let login = envelope.into_data().unwrap();
        assert_eq!(login.token, "a.b.c");
        assert_eq!(login.email, "admin@example.com");
    }

    #[test]
    fn test_parse_user_recaps_enveloped() {
        let json = r#"{"status": true, "data": [
            {"id": 1, "name": "Budi", "email": "budi@example.com",
             "incomes": [{"id": 5, "totalQuantityKg": 3.0}], "expenses": []}
        ]}"#;

        let users = ApiClient::parse_user_recaps(json).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].total_income_kg(), 3.0);
    }

    #[test]
    fn test_parse_user_recaps_bare_data() {
        let json = r#"{"data": [
            {"id": 2, "name": "Siti", "email": "siti@example.com"}
        ]}"#;

        let users = ApiClient::parse_user_recaps(json).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].incomes.is_empty());
    }

    #[test]
    fn test_parse_user_recaps_rejected_envelope() {
        let json = r#"{"status": false, "message": "Token kedaluwarsa"}"#;
        let err = ApiClient::parse_user_recaps(json).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Token kedaluwarsa"));
    }
}
