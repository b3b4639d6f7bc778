//! PDF generator HTTP client

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;
use uos_config::PdfGeneratorConfig;
use uos_domain_core::OfferPayload;
use uos_errors::{AppError, AppResult};
use uos_ports::{GeneratedOffer, OfferGenerator};

/// Shown when the generator gives no usable error message
pub const FALLBACK_ERROR: &str = "Gagal generate penawaran";

#[derive(Debug, Default, Deserialize)]
struct GeneratorResponse {
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GeneratorResponse {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// OfferGenerator backed by the remote HTTP function
#[derive(Debug, Clone)]
pub struct PdfGeneratorClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Secret<String>,
}

impl PdfGeneratorClient {
    /// Create a client; `default_key` is used when the config carries no key of its own
    pub fn new(config: &PdfGeneratorConfig, default_key: &Secret<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().unwrap_or_else(|| default_key.clone()),
        })
    }
}

#[async_trait]
impl OfferGenerator for PdfGeneratorClient {
    async fn generate(&self, payload: &OfferPayload) -> AppResult<GeneratedOffer> {
        info!(
            lead_id = %payload.lead_id,
            items = payload.items.len(),
            "Submitting offer to PDF generator"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("apikey", self.api_key.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "PDF generator unreachable");
                AppError::external_service(FALLBACK_ERROR)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read PDF generator response");
            AppError::external_service(FALLBACK_ERROR)
        })?;
        let parsed = GeneratorResponse::parse(&body);

        if !status.is_success() {
            error!(%status, body = %body, "PDF generator rejected offer");
            let message = non_empty(parsed.error).unwrap_or_else(|| FALLBACK_ERROR.to_string());
            return Err(AppError::external_service(message));
        }

        match non_empty(parsed.pdf_url) {
            Some(pdf_url) => {
                info!(lead_id = %payload.lead_id, %pdf_url, "Offer PDF generated");
                Ok(GeneratedOffer { pdf_url })
            }
            None => {
                warn!(%status, "PDF generator answered without a document location");
                Err(AppError::external_service(
                    non_empty(parsed.error).unwrap_or_else(|| FALLBACK_ERROR.to_string()),
                ))
            }
        }
    }
}
