//! PostgREST access to the `offers` table

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;
use uos_domain_core::{AccessToken, OfferSummary};
use uos_errors::AppResult;
use uos_ports::OfferRepository;

use crate::client::SupabaseClient;
use crate::error::map_rest_error;

/// Summary columns plus the joined lead name
const SUMMARY_SELECT: &str = "id,offer_number,total_amount,pdf_url,created_at,leads(name)";

/// OfferRepository backed by PostgREST
#[derive(Debug, Clone)]
pub struct SupabaseOfferRepository {
    client: SupabaseClient,
}

impl SupabaseOfferRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OfferRepository for SupabaseOfferRepository {
    async fn list_offers(&self, token: &AccessToken) -> AppResult<Vec<OfferSummary>> {
        let context = "List offers";
        let request = self
            .client
            .rest(Method::GET, "offers", token)?
            .query(&[("select", SUMMARY_SELECT), ("order", "id.desc")]);

        let response = self.client.send(request, context).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_rest_error(status, &body, context));
        }

        let offers: Vec<OfferSummary> = SupabaseClient::json(response, context).await?;
        debug!(count = offers.len(), "Offers loaded");
        Ok(offers)
    }
}
