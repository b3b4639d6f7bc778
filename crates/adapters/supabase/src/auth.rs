//! GoTrue authentication

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uos_domain_core::{AccessToken, AuthUser, RefreshToken, Session};
use uos_errors::AppResult;
use uos_ports::AuthProvider;

use crate::client::SupabaseClient;
use crate::error::map_auth_error;

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: AccessToken::new(token.access_token),
            expires_in: token.expires_in,
            refresh_token: token.refresh_token.map(RefreshToken::new),
            user: token.user,
        }
    }
}

/// AuthProvider backed by Supabase GoTrue
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let context = "Sign in with password";
        let request = self
            .client
            .auth(Method::POST, "token", None)?
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password });

        let response = self.client.send(request, context).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Password sign-in rejected");
            return Err(map_auth_error(status, &body, context));
        }

        let token: TokenResponse = SupabaseClient::json(response, context).await?;
        info!(user_id = %token.user.id, "User signed in");

        Ok(token.into())
    }

    async fn get_session(&self, token: &AccessToken) -> AppResult<Option<Session>> {
        let context = "Get current session";
        let request = self.client.auth(Method::GET, "user", Some(token))?;

        let response = self.client.send(request, context).await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(%status, "Session token is no longer valid");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body, context));
        }

        let user: AuthUser = SupabaseClient::json(response, context).await?;
        Ok(Some(Session {
            access_token: token.clone(),
            expires_in: None,
            refresh_token: None,
            user,
        }))
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<Option<Session>> {
        let context = "Refresh session";
        let request = self
            .client
            .auth(Method::POST, "token", None)?
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrant {
                refresh_token: refresh_token.expose(),
            });

        let response = self.client.send(request, context).await?;
        let status = response.status();
        // GoTrue answers 400 for revoked or already used refresh tokens
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            debug!(%status, "Refresh token is no longer valid");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body, context));
        }

        let token: TokenResponse = SupabaseClient::json(response, context).await?;
        debug!(user_id = %token.user.id, "Session refreshed");
        Ok(Some(token.into()))
    }

    async fn sign_out(&self, token: &AccessToken) -> AppResult<()> {
        let context = "Sign out";
        let request = self.client.auth(Method::POST, "logout", Some(token))?;

        let response = self.client.send(request, context).await?;
        let status = response.status();
        // An already expired token means there is nothing left to revoke
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_auth_error(status, &body, context))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.health_check().await
    }
}
