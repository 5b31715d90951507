//! Billing: plan catalog, entitlements, usage accounting, and checkout.

pub mod checkout;
pub mod entitlements;
pub mod plans;
pub mod usage;

pub use checkout::{BillingPeriod, CheckoutClient, CheckoutOrchestrator};
pub use entitlements::{feature_lock, has_feature_access, FeatureLock};
pub use plans::{
    CreditBundle, LocalizedName, PlanCatalog, PlanConfig, PlanId, PlanLimits, TrialConfig,
};
pub use usage::{
    is_credits_exhausted, is_credits_low, resolve_monthly_limit, usage_stats, UsageStats,
    DEFAULT_MONTHLY_LIMIT, LOW_CREDITS_THRESHOLD,
};
