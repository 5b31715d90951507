//! The live HTTP client for the Postflow backend.
//!
//! One typed method per route. Authenticated calls short-circuit locally
//! when the session holds no credential: fire-and-forget calls become
//! silent no-ops, data-bearing calls fail with `Unauthorized` without a
//! network round trip.
//!
//! The client implements the collaborator traits ([`CheckoutClient`],
//! [`ContentGenerator`], [`OnboardingStore`], [`EventSink`],
//! [`AbandonmentClient`]) so the orchestrator, wizard and tracker never
//! depend on it directly.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::billing::checkout::{BillingPeriod, CheckoutClient};
use crate::billing::plans::PlanId;
use crate::config::{ClientConfig, Language};
use crate::error::{PostflowError, Result};
use crate::onboarding::preferences::OnboardingPreferences;
use crate::onboarding::wizard::{ContentGenerator, GenerateRequest, OnboardingStore};
use crate::session::Session;
use crate::tracking::{AbandonmentClient, AbandonmentStatus, EventSink, UpsellEvent};

/// User preferences as returned by the backend, with the completion flag
/// alongside the wizard fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesEnvelope {
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(flatten)]
    pub preferences: OnboardingPreferences,
}

/// Generation response. Older backend versions used `generated_content`;
/// `content` wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    generated_content: Option<String>,
}

impl GenerateResponse {
    /// Extract the generated text, whichever field carried it.
    pub fn into_content(self) -> Result<String> {
        self.content
            .or(self.generated_content)
            .ok_or_else(|| PostflowError::bad_request("Generation response carried no content"))
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutUrlResponse {
    checkout_url: String,
}

/// Dashboard statistic: estimated hours saved by scheduled posting.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SchedulerStats {
    #[serde(default)]
    pub hours_saved: f64,
}

#[derive(Serialize)]
struct CreateCheckoutRequest {
    plan: PlanId,
    billing_period: BillingPeriod,
}

#[derive(Serialize)]
struct PurchaseBundleRequest<'a> {
    bundle_id: &'a str,
}

#[derive(Serialize)]
struct TrackPricingRequest<'a> {
    event_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<PlanId>,
    metadata: &'a std::collections::HashMap<String, String>,
}

/// Typed client for the Postflow backend API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    language: Language,
    session: Arc<RwLock<Session>>,
}

impl ApiClient {
    /// Build a client from a validated config and an initial session.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            language: config.language,
            session: Arc::new(RwLock::new(session)),
        })
    }

    /// Replace the session after login, logout, or a confirmed plan change.
    pub fn set_session(&self, session: Session) {
        *self.session.write().unwrap() = session;
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    /// The UI language this client was configured with.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    fn bearer(&self) -> Option<String> {
        self.session
            .read()
            .unwrap()
            .bearer()
            .map(|token| token.expose_secret().clone())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let response = self
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_unit<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<()> {
        self.http
            .post(self.endpoint(path)?)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// `GET /api/user/preferences`
    pub async fn fetch_preferences(&self) -> Result<PreferencesEnvelope> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        self.get_json("/api/user/preferences", &token).await
    }

    /// `GET /api/scheduler/stats`
    pub async fn scheduler_stats(&self) -> Result<SchedulerStats> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        self.get_json("/api/scheduler/stats", &token).await
    }
}

impl ContentGenerator for ApiClient {
    /// `POST /api/generate`
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        let response: GenerateResponse = self.post_json("/api/generate", &token, request).await?;
        response.into_content()
    }
}

impl OnboardingStore for ApiClient {
    /// `POST /api/user/preferences`
    ///
    /// Silent no-op without a credential; nothing to persist against.
    async fn save_preferences(&self, preferences: &OnboardingPreferences) -> Result<()> {
        let Some(token) = self.bearer() else {
            tracing::debug!(target: "postflow::client", "No credential, skipping preference save");
            return Ok(());
        };
        self.post_unit("/api/user/preferences", &token, preferences)
            .await
    }

    /// `POST /api/user/complete-onboarding`
    async fn complete_onboarding(&self) -> Result<()> {
        let Some(token) = self.bearer() else {
            return Ok(());
        };
        self.post_unit(
            "/api/user/complete-onboarding",
            &token,
            &serde_json::json!({}),
        )
        .await
    }
}

impl CheckoutClient for ApiClient {
    /// `POST /api/subscriptions/create-checkout`
    async fn create_checkout(&self, plan: PlanId, period: BillingPeriod) -> Result<String> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        let body = CreateCheckoutRequest {
            plan,
            billing_period: period,
        };
        let response: CheckoutUrlResponse = self
            .post_json("/api/subscriptions/create-checkout", &token, &body)
            .await?;
        Ok(response.checkout_url)
    }

    /// `POST /api/credits/purchase`
    async fn purchase_bundle(&self, bundle_id: &str) -> Result<String> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        let response: CheckoutUrlResponse = self
            .post_json(
                "/api/credits/purchase",
                &token,
                &PurchaseBundleRequest { bundle_id },
            )
            .await?;
        Ok(response.checkout_url)
    }
}

#[async_trait]
impl EventSink for ApiClient {
    /// `POST /api/email/track-pricing`
    ///
    /// Fire-and-forget: failures are logged and dropped, and no request is
    /// made without a credential.
    async fn emit(&self, event: UpsellEvent) {
        let Some(token) = self.bearer() else {
            return;
        };
        let body = TrackPricingRequest {
            event_type: event.kind.as_str(),
            plan: event.plan,
            metadata: &event.metadata,
        };
        if let Err(err) = self.post_unit("/api/email/track-pricing", &token, &body).await {
            tracing::debug!(
                target: "postflow::client",
                error = %err,
                event = event.kind.as_str(),
                "Dropped tracking event"
            );
        }
    }
}

#[async_trait]
impl AbandonmentClient for ApiClient {
    /// `GET /api/email/abandonment-status`
    async fn abandonment_status(&self) -> Result<AbandonmentStatus> {
        let token = self
            .bearer()
            .ok_or_else(|| PostflowError::unauthorized("No credential"))?;
        self.get_json("/api/email/abandonment-status", &token).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}
