//! PostgREST access to the `leads` table

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};
use uos_domain_core::{AccessToken, Lead, LeadId, NewLead};
use uos_errors::{AppError, AppResult};
use uos_ports::LeadRepository;

use crate::client::SupabaseClient;
use crate::error::map_rest_error;

const TABLE: &str = "leads";

/// LeadRepository backed by PostgREST
#[derive(Debug, Clone)]
pub struct SupabaseLeadRepository {
    client: SupabaseClient,
}

impl SupabaseLeadRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, request: reqwest::RequestBuilder, context: &str) -> AppResult<Vec<Lead>> {
        let response = self.client.send(request, context).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_rest_error(status, &body, context));
        }
        SupabaseClient::json(response, context).await
    }
}

#[async_trait]
impl LeadRepository for SupabaseLeadRepository {
    async fn list_leads(&self, token: &AccessToken) -> AppResult<Vec<Lead>> {
        let request = self
            .client
            .rest(Method::GET, TABLE, token)?
            .query(&[("select", "*"), ("order", "id.desc")]);

        let leads = self.fetch(request, "List leads").await?;
        debug!(count = leads.len(), "Leads loaded");
        Ok(leads)
    }

    async fn find_lead(&self, token: &AccessToken, id: LeadId) -> AppResult<Option<Lead>> {
        let filter = format!("eq.{}", id);
        let request = self
            .client
            .rest(Method::GET, TABLE, token)?
            .query(&[("select", "*"), ("id", filter.as_str())]);

        let leads = self.fetch(request, "Find lead").await?;
        Ok(leads.into_iter().next())
    }

    async fn create_lead(&self, token: &AccessToken, lead: &NewLead) -> AppResult<Lead> {
        let request = self
            .client
            .rest(Method::POST, TABLE, token)?
            .header("Prefer", "return=representation")
            .json(lead);

        let created = self
            .fetch(request, "Create lead")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::database("Create lead: store returned no row"))?;

        info!(lead_id = %created.id, "Lead created");
        Ok(created)
    }
}
