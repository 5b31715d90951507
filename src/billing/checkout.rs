//! Checkout orchestration.
//!
//! The orchestrator turns a plan or bundle selection into a hosted checkout
//! URL. It owns the single-flight guard: only one checkout request may be in
//! flight per orchestrator, and the busy flag is cleared on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::plans::PlanId;
use crate::error::{PostflowError, Result};
use crate::session::Session;
use crate::tracking::{EventSink, UpsellEvent, UpsellEventKind};

/// Billing period for a subscription checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    /// Wire value for the checkout endpoint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl Default for BillingPeriod {
    fn default() -> Self {
        Self::Monthly
    }
}

/// Collaborator that creates hosted checkout sessions on the backend.
pub trait CheckoutClient: Send + Sync {
    /// Create a subscription checkout session, returning the hosted URL.
    async fn create_checkout(&self, plan: PlanId, period: BillingPeriod) -> Result<String>;

    /// Create a one-time credit bundle checkout session.
    async fn purchase_bundle(&self, bundle_id: &str) -> Result<String>;
}

/// Clears the busy flag when the request scope ends, on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives plan upgrades and credit purchases through hosted checkout.
pub struct CheckoutOrchestrator<C: CheckoutClient, E: EventSink> {
    client: C,
    sink: E,
    busy: AtomicBool,
}

impl<C: CheckoutClient, E: EventSink> CheckoutOrchestrator<C, E> {
    /// Create an orchestrator over a checkout client and an event sink.
    #[must_use]
    pub fn new(client: C, sink: E) -> Self {
        Self {
            client,
            sink,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a checkout request is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PostflowError::in_flight("checkout"));
        }
        Ok(BusyGuard(&self.busy))
    }

    /// Start a subscription checkout for `plan`.
    ///
    /// Returns `Ok(None)` without touching the network when the session
    /// holds no credential; the caller should route to login. The
    /// checkout-started event is emitted before the request so that an
    /// abandoned checkout is still visible in the funnel. Client errors
    /// propagate unmodified.
    pub async fn create_checkout(
        &self,
        session: &Session,
        plan: PlanId,
        period: BillingPeriod,
    ) -> Result<Option<String>> {
        if session.bearer().is_none() {
            tracing::debug!(
                target: "postflow::checkout",
                plan = plan.as_str(),
                "No credential, skipping checkout"
            );
            return Ok(None);
        }

        let _guard = self.acquire()?;

        self.sink
            .emit(
                UpsellEvent::new(UpsellEventKind::CheckoutStarted)
                    .with_plan(plan)
                    .with_metadata("billing_period", period.as_str()),
            )
            .await;

        let url = self.client.create_checkout(plan, period).await?;

        tracing::info!(
            target: "postflow::checkout",
            plan = plan.as_str(),
            period = period.as_str(),
            "Checkout session created"
        );
        Ok(Some(url))
    }

    /// Start a one-time checkout for a credit bundle.
    ///
    /// Same credential short-circuit and single-flight guard as
    /// [`Self::create_checkout`], but no funnel event is emitted.
    pub async fn purchase_credit_bundle(
        &self,
        session: &Session,
        bundle_id: &str,
    ) -> Result<Option<String>> {
        if session.bearer().is_none() {
            return Ok(None);
        }

        let _guard = self.acquire()?;

        let url = self.client.purchase_bundle(bundle_id).await?;

        tracing::info!(
            target: "postflow::checkout",
            bundle = bundle_id,
            "Bundle checkout session created"
        );
        Ok(Some(url))
    }
}

/// Mock checkout client for testing.
#[cfg(any(test, feature = "test-client"))]
pub mod test {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Checkout client that counts calls and can be made to fail.
    #[derive(Default)]
    pub struct MockCheckoutClient {
        calls: AtomicU32,
        fail: AtomicBool,
    }

    impl MockCheckoutClient {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent call fail.
        pub fn fail_requests(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        /// Number of checkout sessions requested.
        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_url(&self) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(PostflowError::service_unavailable("checkout backend down"));
            }
            Ok(format!("https://checkout.stripe.com/c/pay/cs_test_{n}"))
        }
    }

    impl CheckoutClient for MockCheckoutClient {
        async fn create_checkout(&self, _plan: PlanId, _period: BillingPeriod) -> Result<String> {
            self.next_url()
        }

        async fn purchase_bundle(&self, _bundle_id: &str) -> Result<String> {
            self.next_url()
        }
    }
}
