//! Upsell funnel tracking and abandonment recovery.
//!
//! Tracking is one-way: events are emitted to an [`EventSink`] and failures
//! are logged and dropped, never surfaced to the user and never retried.
//! Abandonment recovery only applies to free-tier prospects; paid users
//! never trigger the status lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::plans::PlanId;
use crate::error::Result;
use crate::session::Session;

/// Funnel event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsellEventKind {
    PricingViewed,
    PlanSelected,
    CheckoutStarted,
    CheckoutCompleted,
}

impl UpsellEventKind {
    /// Wire value for the tracking endpoint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PricingViewed => "pricing_viewed",
            Self::PlanSelected => "plan_selected",
            Self::CheckoutStarted => "checkout_started",
            Self::CheckoutCompleted => "checkout_completed",
        }
    }
}

/// A single funnel event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsellEvent {
    pub kind: UpsellEventKind,
    pub plan: Option<PlanId>,
    pub metadata: HashMap<String, String>,
    /// Captured when the event is created, not when it is delivered.
    pub occurred_at: DateTime<Utc>,
}

impl UpsellEvent {
    /// Create an event with no plan or metadata.
    #[must_use]
    pub fn new(kind: UpsellEventKind) -> Self {
        Self {
            kind,
            plan: None,
            metadata: HashMap::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Attach the plan involved in the event.
    #[must_use]
    pub fn with_plan(mut self, plan: PlanId) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One-way event sink for funnel events.
///
/// Implementations must swallow their own failures: log and drop, never
/// propagate, never retry.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emit an event. Infallible by contract.
    async fn emit(&self, event: UpsellEvent);
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: UpsellEvent) {}
}

/// Sink that logs events via `tracing` at DEBUG level.
///
/// Useful in development when no backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: UpsellEvent) {
        tracing::debug!(
            target: "postflow::tracking",
            kind = event.kind.as_str(),
            plan = event.plan.map(|p| p.as_str()),
            "upsell event"
        );
    }
}

/// Convenience emitters for the standard funnel events.
pub struct UpsellTracker<S: EventSink> {
    sink: S,
}

impl<S: EventSink> UpsellTracker<S> {
    /// Create a tracker over a sink.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Emit an arbitrary event.
    pub async fn track(&self, event: UpsellEvent) {
        self.sink.emit(event).await;
    }

    /// The pricing page was viewed.
    pub async fn pricing_viewed(&self) {
        self.track(UpsellEvent::new(UpsellEventKind::PricingViewed))
            .await;
    }

    /// A plan card was selected.
    pub async fn plan_selected(&self, plan: PlanId) {
        self.track(UpsellEvent::new(UpsellEventKind::PlanSelected).with_plan(plan))
            .await;
    }

    /// Checkout was started for a plan.
    pub async fn checkout_started(&self, plan: PlanId) {
        self.track(UpsellEvent::new(UpsellEventKind::CheckoutStarted).with_plan(plan))
            .await;
    }

    /// Checkout completed for a plan.
    pub async fn checkout_completed(&self, plan: PlanId) {
        self.track(UpsellEvent::new(UpsellEventKind::CheckoutCompleted).with_plan(plan))
            .await;
    }
}

/// Server-computed abandonment state, consumed read-only by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AbandonmentStatus {
    pub is_abandoned: bool,
    pub show_reminder_banner: bool,
}

impl AbandonmentStatus {
    /// The synthetic "nothing to recover" status.
    #[must_use]
    pub fn not_abandoned() -> Self {
        Self::default()
    }
}

/// Collaborator that fetches the abandonment status from the backend.
#[async_trait]
pub trait AbandonmentClient: Send + Sync {
    async fn abandonment_status(&self) -> Result<AbandonmentStatus>;
}

/// Fetch the abandonment status for the current session.
///
/// Only free-tier users ever hit the network: for anyone on a paid plan,
/// and for unauthenticated sessions, the synthetic not-abandoned status is
/// returned without a round trip. Fetch failures are logged and swallowed.
pub async fn fetch_abandonment_status<C: AbandonmentClient>(
    client: &C,
    session: &Session,
) -> AbandonmentStatus {
    if session.bearer().is_none() || !session.current_plan().is_free() {
        return AbandonmentStatus::not_abandoned();
    }

    match client.abandonment_status().await {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(
                target: "postflow::tracking",
                error = %err,
                "Failed to fetch abandonment status"
            );
            AbandonmentStatus::not_abandoned()
        }
    }
}

/// Mock sinks and clients for testing.
#[cfg(any(test, feature = "test-client"))]
pub mod test {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::error::PostflowError;

    /// Sink that captures every emitted event.
    #[derive(Clone, Default)]
    pub struct CapturingEventSink {
        events: Arc<Mutex<Vec<UpsellEvent>>>,
    }

    impl CapturingEventSink {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All events emitted so far, in order.
        pub fn events(&self) -> Vec<UpsellEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventSink for CapturingEventSink {
        async fn emit(&self, event: UpsellEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Abandonment client that counts calls and can be made to fail.
    #[derive(Default)]
    pub struct MockAbandonmentClient {
        calls: AtomicU32,
        fail: AtomicBool,
        status: Mutex<AbandonmentStatus>,
    }

    impl MockAbandonmentClient {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_status(&self, status: AbandonmentStatus) {
            *self.status.lock().unwrap() = status;
        }

        pub fn fail_next(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        /// Number of network calls issued.
        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AbandonmentClient for MockAbandonmentClient {
        async fn abandonment_status(&self) -> Result<AbandonmentStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.swap(false, Ordering::SeqCst) {
                return Err(PostflowError::service_unavailable("backend down"));
            }
            Ok(*self.status.lock().unwrap())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test::{CapturingEventSink, MockAbandonmentClient};
    use super::*;
    use crate::session::UserSnapshot;

    #[test]
    fn test_event_kind_wire_values() {
        assert_eq!(UpsellEventKind::PricingViewed.as_str(), "pricing_viewed");
        assert_eq!(UpsellEventKind::CheckoutStarted.as_str(), "checkout_started");
        let json = serde_json::to_string(&UpsellEventKind::PlanSelected).unwrap();
        assert_eq!(json, "\"plan_selected\"");
    }

    #[test]
    fn test_event_builder() {
        let event = UpsellEvent::new(UpsellEventKind::PlanSelected)
            .with_plan(PlanId::Pro)
            .with_metadata("source", "pricing_page");
        assert_eq!(event.plan, Some(PlanId::Pro));
        assert_eq!(event.metadata.get("source").unwrap(), "pricing_page");
    }

    #[tokio::test]
    async fn test_tracker_convenience_emitters() {
        let sink = CapturingEventSink::new();
        let tracker = UpsellTracker::new(sink.clone());

        tracker.pricing_viewed().await;
        tracker.plan_selected(PlanId::Pro).await;
        tracker.checkout_started(PlanId::Pro).await;
        tracker.checkout_completed(PlanId::Pro).await;

        let events = sink.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].kind, UpsellEventKind::PricingViewed);
        assert_eq!(events[0].plan, None);
        assert_eq!(events[3].kind, UpsellEventKind::CheckoutCompleted);
        assert_eq!(events[3].plan, Some(PlanId::Pro));
    }

    #[tokio::test]
    async fn test_noop_sink_does_not_panic() {
        NoOpEventSink
            .emit(UpsellEvent::new(UpsellEventKind::PricingViewed))
            .await;
    }

    fn free_session() -> Session {
        Session::authenticated("tok", UserSnapshot::free())
    }

    fn pro_session() -> Session {
        Session::authenticated(
            "tok",
            UserSnapshot {
                plan: PlanId::Pro,
                ..UserSnapshot::default()
            },
        )
    }

    #[tokio::test]
    async fn test_paid_user_skips_network_call() {
        let client = MockAbandonmentClient::new();
        client.set_status(AbandonmentStatus {
            is_abandoned: true,
            show_reminder_banner: true,
        });

        let status = fetch_abandonment_status(&client, &pro_session()).await;
        assert_eq!(status, AbandonmentStatus::not_abandoned());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_free_user_fetches_status() {
        let client = MockAbandonmentClient::new();
        client.set_status(AbandonmentStatus {
            is_abandoned: true,
            show_reminder_banner: true,
        });

        let status = fetch_abandonment_status(&client, &free_session()).await;
        assert!(status.is_abandoned);
        assert!(status.show_reminder_banner);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let client = MockAbandonmentClient::new();
        client.fail_next();

        let status = fetch_abandonment_status(&client, &free_session()).await;
        assert_eq!(status, AbandonmentStatus::not_abandoned());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_session_skips_network_call() {
        let client = MockAbandonmentClient::new();
        let status = fetch_abandonment_status(&client, &Session::anonymous()).await;
        assert_eq!(status, AbandonmentStatus::not_abandoned());
        assert_eq!(client.call_count(), 0);
    }
}
