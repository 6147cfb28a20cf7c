use crate::domain::model::Session;
use crate::domain::ports::AuthProvider;
use crate::supabase::{api_error, SupabaseClient};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    #[serde(default)]
    email: Option<String>,
}

/// Sign-up answers in two shapes: a token response when the instance
/// auto-confirms, or a bare user object while confirmation is pending.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<TokenUser>,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token", self.base_url());
        tracing::debug!("Signing in {} at {}", email, url);

        let response = self
            .http()
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("sign in", response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_email: token.user.and_then(|u| u.email),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let url = format!("{}/auth/v1/signup", self.base_url());
        tracing::debug!("Registering {} at {}", email, url);

        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("sign up", response).await);
        }

        let body: SignUpResponse = response.json().await?;
        match body.access_token {
            Some(access_token) => Ok(Some(Session {
                access_token,
                refresh_token: body.refresh_token,
                user_email: body.user.and_then(|u| u.email).or(body.email),
            })),
            None => Ok(None),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.base_url());

        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error("sign out", response).await);
        }
        Ok(())
    }
}
