//! Credit and usage accounting.
//!
//! Pure derivations over the session's [`UserSnapshot`] and the plan
//! catalog; nothing here mutates state or touches the network.

use serde::Serialize;

use super::plans::PlanCatalog;
use crate::session::UserSnapshot;

/// Hard default for users whose record carries no limit and whose plan is
/// missing from the catalog. Matches the free-tier allotment.
pub const DEFAULT_MONTHLY_LIMIT: u32 = 3;

/// Below this many remaining credits (and above zero) the UI shows the
/// low-credits warning.
pub const LOW_CREDITS_THRESHOLD: u32 = 10;

/// Derived usage figures for display and gating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStats {
    pub current_usage: u32,
    pub monthly_limit: u32,
    pub bonus_credits: u32,
    pub remaining_credits: u32,
    pub percent_used: f64,
}

/// Resolve the effective monthly limit for a user.
///
/// Ordered-default chain, in this exact order:
/// 1. the user record's explicit `monthly_limit`,
/// 2. the plan's configured `monthly_generations`,
/// 3. [`DEFAULT_MONTHLY_LIMIT`].
///
/// The chain determines free-tier behavior for legacy user records that
/// lack a limit field, so the order is load-bearing.
#[must_use]
pub fn resolve_monthly_limit(user: &UserSnapshot, catalog: &PlanCatalog) -> u32 {
    user.monthly_limit
        .or_else(|| catalog.get(user.plan).map(|p| p.limits.monthly_generations))
        .unwrap_or(DEFAULT_MONTHLY_LIMIT)
}

/// Derive the full usage stats for a user.
///
/// `remaining_credits` is never negative; `percent_used` is clamped to
/// `[0, 100]`.
#[must_use]
pub fn usage_stats(user: &UserSnapshot, catalog: &PlanCatalog) -> UsageStats {
    let monthly_limit = resolve_monthly_limit(user, catalog);

    let remaining = i64::from(monthly_limit) - i64::from(user.current_usage)
        + i64::from(user.bonus_credits);
    let remaining_credits = remaining.max(0) as u32;

    let percent_used = if monthly_limit == 0 {
        100.0
    } else {
        (f64::from(user.current_usage) / f64::from(monthly_limit) * 100.0).min(100.0)
    };

    UsageStats {
        current_usage: user.current_usage,
        monthly_limit,
        bonus_credits: user.bonus_credits,
        remaining_credits,
        percent_used,
    }
}

/// True when remaining credits are strictly positive and below
/// [`LOW_CREDITS_THRESHOLD`].
#[must_use]
pub fn is_credits_low(user: &UserSnapshot, catalog: &PlanCatalog) -> bool {
    let remaining = usage_stats(user, catalog).remaining_credits;
    remaining > 0 && remaining < LOW_CREDITS_THRESHOLD
}

/// True when no credits remain.
#[must_use]
pub fn is_credits_exhausted(user: &UserSnapshot, catalog: &PlanCatalog) -> bool {
    usage_stats(user, catalog).remaining_credits == 0
}
