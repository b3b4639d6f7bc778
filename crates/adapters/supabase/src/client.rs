//! Shared HTTP client for a Supabase project

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;
use uos_config::SupabaseConfig;
use uos_domain_core::AccessToken;
use uos_errors::{AppError, AppResult};

use crate::error::map_transport_error;

/// Supabase client holding the project URL and anon key
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: Secret<String>,
}

impl SupabaseClient {
    /// Create a new client from configuration
    pub fn new(config: &SupabaseConfig) -> AppResult<Self> {
        info!("Configuring Supabase client for {}", config.url);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("Invalid Supabase path {}: {}", path, e)))
    }

    /// Build a PostgREST request for a table, authorized as the given user
    pub fn rest(&self, method: Method, table: &str, token: &AccessToken) -> AppResult<RequestBuilder> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        debug!(%method, %url, "Building PostgREST request");

        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token.expose()))
    }

    /// Build a GoTrue request; without a user token the anon key is the bearer
    pub fn auth(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> AppResult<RequestBuilder> {
        let url = self.endpoint(&format!("auth/v1/{}", path))?;
        debug!(%method, %url, "Building GoTrue request");

        let bearer = token
            .map(AccessToken::expose)
            .unwrap_or_else(|| self.anon_key.expose_secret());

        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(bearer))
    }

    /// Send a request, mapping transport failures
    pub async fn send(&self, request: RequestBuilder, context: &str) -> AppResult<Response> {
        request
            .send()
            .await
            .map_err(|e| map_transport_error(e, context))
    }

    /// Decode a JSON body, mapping decode failures
    pub async fn json<T: DeserializeOwned>(response: Response, context: &str) -> AppResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| map_transport_error(e, context))
    }

    /// Check that the GoTrue health endpoint answers
    pub async fn health_check(&self) -> AppResult<bool> {
        let request = self.auth(Method::GET, "health", None)?;
        let response = self.send(request, "Supabase health check").await?;
        Ok(response.status().is_success())
    }
}
