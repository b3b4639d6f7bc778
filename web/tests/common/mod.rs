//! Shared fakes and request helpers for router tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::{TimeZone, Utc};
use mockall::mock;
use uos_config::SessionConfig;
use uos_domain_core::{
    AccessToken, AuthUser, Lead, LeadId, LeadName, LeadType, NewLead, OfferPayload, OfferSummary,
    RefreshToken, Rupiah, Session,
};
use uos_errors::{AppError, AppResult};
use uos_ports::{AuthProvider, GeneratedOffer, LeadRepository, OfferGenerator, OfferRepository};
use uos_web::application::SalesHandler;
use uos_web::state::AppState;
use uos_web::views::Views;

pub const EMAIL: &str = "sales@adiwidia.co.id";
pub const PASSWORD: &str = "rahasia";
pub const TOKEN: &str = "tok-1";
/// get_session fails with a transport error for this token
pub const BROKEN_TOKEN: &str = "tok-broken";
pub const REFRESH_TOKEN: &str = "ref-1";
/// refresh_session answers with this access token
pub const REFRESHED_TOKEN: &str = "tok-2";

mock! {
    pub Generator {}

    #[async_trait]
    impl OfferGenerator for Generator {
        async fn generate(&self, payload: &OfferPayload) -> AppResult<GeneratedOffer>;
    }
}

fn session() -> Session {
    session_with(TOKEN, REFRESH_TOKEN)
}

fn session_with(access_token: &str, refresh_token: &str) -> Session {
    Session {
        access_token: AccessToken::new(access_token),
        expires_in: Some(3600),
        refresh_token: Some(RefreshToken::new(refresh_token)),
        user: AuthUser {
            id: "user-1".to_string(),
            email: Some(EMAIL.to_string()),
        },
    }
}

#[derive(Default)]
pub struct FakeAuth {
    pub sign_ins: AtomicUsize,
    pub session_checks: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        if email == EMAIL && password == PASSWORD {
            Ok(session())
        } else {
            Err(AppError::unauthenticated("Invalid login credentials"))
        }
    }

    async fn get_session(&self, token: &AccessToken) -> AppResult<Option<Session>> {
        self.session_checks.fetch_add(1, Ordering::SeqCst);
        match token.expose() {
            TOKEN => Ok(Some(session())),
            REFRESHED_TOKEN => Ok(Some(session_with(REFRESHED_TOKEN, "ref-2"))),
            BROKEN_TOKEN => Err(AppError::external_service("connection reset")),
            _ => Ok(None),
        }
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<Option<Session>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if refresh_token.expose() == REFRESH_TOKEN {
            Ok(Some(session_with(REFRESHED_TOKEN, "ref-2")))
        } else {
            Ok(None)
        }
    }

    async fn sign_out(&self, _token: &AccessToken) -> AppResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn lead(id: i64, name: &str) -> Lead {
    Lead {
        id: LeadId(id),
        name: name.to_string(),
        address: Some("Bandung".to_string()),
        pic_name: Some("Rina".to_string()),
        pic_phone: Some("0812".to_string()),
        lead_type: LeadType::Customer,
    }
}

pub struct FakeLeads {
    pub leads: Mutex<Vec<Lead>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl Default for FakeLeads {
    fn default() -> Self {
        Self {
            leads: Mutex::new(vec![lead(7, "PT Maju Jaya"), lead(5, "SMK Negeri 1")]),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LeadRepository for FakeLeads {
    async fn list_leads(&self, _token: &AccessToken) -> AppResult<Vec<Lead>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.leads.lock().unwrap().clone())
    }

    async fn find_lead(&self, _token: &AccessToken, id: LeadId) -> AppResult<Option<Lead>> {
        Ok(self.leads.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn create_lead(&self, _token: &AccessToken, lead: &NewLead) -> AppResult<Lead> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if lead.name == "Duplikat" {
            return Err(AppError::database(
                "duplicate key value violates unique constraint \"leads_name_key\"",
            ));
        }

        let mut leads = self.leads.lock().unwrap();
        let id = leads.iter().map(|l| l.id.0).max().unwrap_or(0) + 1;
        let created = Lead {
            id: LeadId(id),
            name: lead.name.clone(),
            address: Some(lead.address.clone()),
            pic_name: Some(lead.pic_name.clone()),
            pic_phone: Some(lead.pic_phone.clone()),
            lead_type: lead.lead_type,
        };
        leads.insert(0, created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct FakeOffers {
    pub failure: Option<AppError>,
}

impl FakeOffers {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(AppError::database(message)),
        }
    }
}

#[async_trait]
impl OfferRepository for FakeOffers {
    async fn list_offers(&self, _token: &AccessToken) -> AppResult<Vec<OfferSummary>> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(vec![OfferSummary {
            id: 2,
            offer_number: Some("PNW-002".to_string()),
            total_amount: Some(Rupiah::from(350_000)),
            pdf_url: Some("https://files.example.com/2.pdf".to_string()),
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
            lead: Some(LeadName {
                name: "PT Maju Jaya".to_string(),
            }),
        }])
    }
}

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<FakeAuth>,
    pub leads: Arc<FakeLeads>,
}

pub fn build_with(offers: FakeOffers, generator: MockGenerator) -> TestApp {
    let auth = Arc::new(FakeAuth::default());
    let leads = Arc::new(FakeLeads::default());

    let handler = SalesHandler::new(
        auth.clone(),
        leads.clone(),
        Arc::new(offers),
        Arc::new(generator),
    );
    let state = AppState::new(handler, Views::new().unwrap(), SessionConfig::default());

    TestApp {
        router: uos_web::app(state),
        auth,
        leads,
    }
}

pub fn build(generator: MockGenerator) -> TestApp {
    build_with(FakeOffers::default(), generator)
}

pub fn session_cookie() -> String {
    format!("uos_session={}", TOKEN)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn set_cookie(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
