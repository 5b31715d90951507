//! Postflow client toolkit: plans, entitlements, usage, checkout,
//! upsell tracking, and first-run onboarding for the Postflow content
//! platform.
//!
//! # Quick start
//!
//! ```no_run
//! use postflow::billing::{BillingPeriod, CheckoutOrchestrator, PlanCatalog, PlanId};
//! use postflow::client::ApiClient;
//! use postflow::config::ClientConfig;
//! use postflow::session::{Session, UserSnapshot};
//!
//! # async fn run() -> postflow::Result<()> {
//! let config = ClientConfig::from_env();
//! let session = Session::authenticated("token", UserSnapshot::free());
//! let client = ApiClient::new(&config, session.clone())?;
//!
//! let catalog = PlanCatalog::standard();
//! let orchestrator = CheckoutOrchestrator::new(client.clone(), client.clone());
//! if let Some(url) = orchestrator
//!     .create_checkout(&session, PlanId::Pro, BillingPeriod::Monthly)
//!     .await?
//! {
//!     println!("redirect to {url}");
//! }
//! # let _ = catalog;
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

pub mod billing;
pub mod client;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod session;
pub mod tracking;

pub use billing::{PlanCatalog, PlanId};
pub use client::ApiClient;
pub use config::{ClientConfig, Language};
pub use error::{PostflowError, Result};
pub use session::{Session, UserSnapshot};

/// Initialize tracing with sensible defaults.
///
/// Respects `RUST_LOG` for filtering (default `info`) and switches to JSON
/// output when `POSTFLOW_LOG_JSON` is set to `1` or `true`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("POSTFLOW_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
