//! Entitlements and feature gating.
//!
//! Pure functions of (catalog, plan, feature key). Unknown feature keys
//! resolve to no access, so a typo in a gate never opens a feature.

use super::plans::{PlanCatalog, PlanId};

/// Lock information for a feature the current plan does not include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLock {
    /// The minimum plan that unlocks the feature.
    pub required_plan: PlanId,
}

/// Check whether a plan grants access to a feature.
///
/// Fail-closed: unknown feature keys and unknown plans both resolve `false`.
#[must_use]
pub fn has_feature_access(catalog: &PlanCatalog, plan: PlanId, feature: &str) -> bool {
    catalog
        .get(plan)
        .map(|config| config.has_feature(feature))
        .unwrap_or(false)
}

/// Resolve the lock state of a feature for a plan.
///
/// Returns `None` when access is granted. Otherwise returns the catalog's
/// lock entry for the feature, defaulting to requiring [`PlanId::Pro`] when
/// no explicit mapping exists.
#[must_use]
pub fn feature_lock(catalog: &PlanCatalog, plan: PlanId, feature: &str) -> Option<FeatureLock> {
    if has_feature_access(catalog, plan, feature) {
        return None;
    }
    let required_plan = catalog.lock_for(feature).unwrap_or(PlanId::Pro);
    Some(FeatureLock { required_plan })
}
