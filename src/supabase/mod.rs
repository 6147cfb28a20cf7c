//! Client for the backend-as-a-service: PostgREST table access, object
//! storage for photos, and password-grant auth. Each concern lives in its
//! own submodule; the shared `SupabaseClient` carries the base URL, the anon
//! key, and an optional user access token.

pub mod auth;
pub mod rest;
pub mod storage;

use crate::utils::error::AppError;
use reqwest::Client;

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    table: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        table: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
            table: table.into(),
            bucket: bucket.into(),
        }
    }

    /// Attach a signed-in user's access token; subsequent calls run under
    /// that user's row-level permissions.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The anon key doubles as the bearer token until a user signs in,
    /// matching the official client's behavior.
    pub(crate) fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    pub(crate) fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }
}

/// Turns a non-2xx response into `RemoteOperationFailed`, pulling the human
/// message out of the JSON body when the backend provides one.
pub(crate) async fn api_error(operation: &str, response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|_| String::new());
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| {
                    value
                        .get(key)
                        .and_then(|field| field.as_str())
                        .map(str::to_string)
                })
        })
        .unwrap_or(body);

    AppError::remote(operation, status, message)
}
