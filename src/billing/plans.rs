//! Plan catalog: subscription tiers, credit bundles, and feature locks.
//!
//! The catalog is an explicitly-constructed configuration object passed to
//! the entitlement and usage functions; nothing here reads ambient state.
//!
//! # Example
//!
//! ```rust
//! use postflow::billing::{PlanCatalog, PlanId};
//!
//! let catalog = PlanCatalog::standard();
//! let pro = catalog.get(PlanId::Pro).unwrap();
//! assert!(pro.has_feature("brandAI"));
//! assert_eq!(catalog.yearly_savings_percent(PlanId::Pro), 30);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Language;
use crate::error::{PostflowError, Result};

/// Subscription tier identifier.
///
/// Ordering follows upgrade order: `Free < Pro < Business`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    #[default]
    Free,
    Pro,
    Business,
}

impl PlanId {
    /// Wire value for API payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Business => "business",
        }
    }

    /// Whether this is the free tier.
    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanId {
    type Err = PostflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            other => Err(PostflowError::bad_request(format!(
                "Unknown plan: {}",
                other
            ))),
        }
    }
}

/// Display name with per-locale variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub ru: String,
}

impl LocalizedName {
    #[must_use]
    pub fn new(en: impl Into<String>, ru: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ru: ru.into(),
        }
    }

    /// Pick the variant for a language.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ru => &self.ru,
        }
    }
}

/// Numeric limits attached to a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Text generations per month.
    pub monthly_generations: u32,
    /// Image generations per month.
    pub monthly_images: u32,
    /// Maximum output size per generation, in tokens.
    pub max_tokens: u32,
}

/// Configuration for a single subscription tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    /// Tier identifier.
    pub id: PlanId,
    /// Localized display name.
    pub name: LocalizedName,
    /// Monthly price in whole currency units. Zero for the free tier.
    pub monthly_price: u32,
    /// Yearly price in whole currency units. Zero for the free tier.
    pub yearly_price: u32,
    /// Text-generation credits included per month.
    pub credits: u32,
    /// Image-generation credits included per month.
    pub image_credits: u32,
    /// Highlighted in the pricing UI.
    pub popular: bool,
    /// Named capability gates enabled on this plan.
    pub features: HashSet<String>,
    /// Numeric limits for this plan.
    pub limits: PlanLimits,
}

impl PlanConfig {
    /// Check whether a feature flag is enabled on this plan.
    ///
    /// Unknown keys resolve to `false`.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

/// One-off purchasable credit pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBundle {
    /// Bundle identifier sent to the purchase endpoint.
    pub id: String,
    /// Credits granted.
    pub credits: u32,
    /// Price in whole currency units.
    pub price: u32,
    /// Display label for the bulk discount (e.g. "20%").
    pub savings: String,
}

/// Trial configuration for new signups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialConfig {
    /// Bonus credits granted during the trial.
    pub bonus_credits: u32,
    /// Trial length in days.
    pub trial_days: u32,
    /// Plan the trial unlocks.
    pub trial_plan: PlanId,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            bonus_credits: 0,
            trial_days: 0,
            trial_plan: PlanId::Pro,
        }
    }
}

/// The full plan catalog: tiers, credit bundles, trial config, and the
/// feature-lock map used for upsell prompts.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: HashMap<PlanId, PlanConfig>,
    bundles: Vec<CreditBundle>,
    trial: TrialConfig,
    feature_locks: HashMap<String, PlanId>,
}

impl PlanCatalog {
    /// Create a builder for constructing a catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The production catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .plan(PlanId::Free)
                .name("Free", "Бесплатный")
                .monthly_price(0)
                .yearly_price(0)
                .credits(3)
                .image_credits(2)
                .features(["basicGeneration", "allContentTypes", "basicTones"])
                .limits(PlanLimits {
                    monthly_generations: 3,
                    monthly_images: 2,
                    max_tokens: 250,
                })
                .done()
            .plan(PlanId::Pro)
                .name("Pro", "Pro")
                .monthly_price(15)
                .yearly_price(126)
                .credits(200)
                .image_credits(30)
                .popular()
                .features([
                    "basicGeneration",
                    "allContentTypes",
                    "basicTones",
                    "extendedTones",
                    "favorites",
                    "postGoals",
                    "brandAI",
                    "marketingSets",
                    "advancedStyles",
                    "analytics",
                    "export",
                    "prioritySupport",
                ])
                .limits(PlanLimits {
                    monthly_generations: 200,
                    monthly_images: 30,
                    max_tokens: 350,
                })
                .done()
            .plan(PlanId::Business)
                .name("Business", "Бизнес")
                .monthly_price(39)
                .yearly_price(327)
                .credits(600)
                .image_credits(100)
                .features([
                    "basicGeneration",
                    "allContentTypes",
                    "basicTones",
                    "extendedTones",
                    "favorites",
                    "postGoals",
                    "brandAI",
                    "marketingSets",
                    "advancedStyles",
                    "analytics",
                    "export",
                    "prioritySupport",
                    "priorityProcessing",
                    "batchGeneration",
                    "teamAccess",
                ])
                .limits(PlanLimits {
                    monthly_generations: 600,
                    monthly_images: 100,
                    max_tokens: 500,
                })
                .done()
            .bundle("bundle_100", 100, 9, "10%")
            .bundle("bundle_300", 300, 24, "20%")
            .bundle("bundle_1000", 1000, 69, "31%")
            .trial(50, 7, PlanId::Pro)
            .lock_feature("brandAI", PlanId::Pro)
            .lock_feature("marketingSets", PlanId::Pro)
            .lock_feature("advancedStyles", PlanId::Pro)
            .lock_feature("analytics", PlanId::Pro)
            .lock_feature("batchGeneration", PlanId::Business)
            .build()
    }

    /// Get a plan's configuration.
    #[must_use]
    pub fn get(&self, plan: PlanId) -> Option<&PlanConfig> {
        self.plans.get(&plan)
    }

    /// All configured plans, in upgrade order.
    #[must_use]
    pub fn plans(&self) -> Vec<&PlanConfig> {
        let mut plans: Vec<&PlanConfig> = self.plans.values().collect();
        plans.sort_by_key(|p| p.id);
        plans
    }

    /// The purchasable credit bundles, smallest first.
    #[must_use]
    pub fn bundles(&self) -> &[CreditBundle] {
        &self.bundles
    }

    /// Look up a credit bundle by id.
    #[must_use]
    pub fn bundle(&self, bundle_id: &str) -> Option<&CreditBundle> {
        self.bundles.iter().find(|b| b.id == bundle_id)
    }

    /// Trial configuration.
    #[must_use]
    pub fn trial(&self) -> &TrialConfig {
        &self.trial
    }

    /// The minimum plan that unlocks a feature, per the explicit lock map.
    #[must_use]
    pub fn lock_for(&self, feature: &str) -> Option<PlanId> {
        self.feature_locks.get(feature).copied()
    }

    /// Percentage saved by paying yearly instead of monthly, rounded.
    ///
    /// Zero for the free tier and for unknown plans.
    #[must_use]
    pub fn yearly_savings_percent(&self, plan: PlanId) -> u32 {
        let Some(config) = self.get(plan) else {
            return 0;
        };
        if config.monthly_price == 0 {
            return 0;
        }
        let monthly_total = f64::from(config.monthly_price) * 12.0;
        let savings = monthly_total - f64::from(config.yearly_price);
        (savings / monthly_total * 100.0).round() as u32
    }

    /// Validate catalog invariants.
    ///
    /// - The free tier is zero-priced.
    /// - For paid plans, the yearly price is below 12x the monthly price.
    /// - Bundle price-per-credit strictly decreases as bundle size grows.
    pub fn validate(&self) -> Result<()> {
        for config in self.plans.values() {
            if config.id.is_free() {
                if config.monthly_price != 0 || config.yearly_price != 0 {
                    return Err(PostflowError::bad_request(
                        "Free plan must be zero-priced".to_string(),
                    ));
                }
            } else if u64::from(config.yearly_price) >= 12 * u64::from(config.monthly_price) {
                return Err(PostflowError::bad_request(format!(
                    "Plan '{}' yearly price must undercut 12x monthly",
                    config.id
                )));
            }
        }

        let mut bundles: Vec<&CreditBundle> = self.bundles.iter().collect();
        bundles.sort_by_key(|b| b.credits);
        for pair in bundles.windows(2) {
            let (small, large) = (pair[0], pair[1]);
            if small.credits == large.credits {
                return Err(PostflowError::bad_request(format!(
                    "Duplicate bundle size: {} credits",
                    small.credits
                )));
            }
            // Unit price must strictly decrease; compare cross-multiplied
            // to stay in integer arithmetic.
            let small_unit = u64::from(small.price) * u64::from(large.credits);
            let large_unit = u64::from(large.price) * u64::from(small.credits);
            if large_unit >= small_unit {
                return Err(PostflowError::bad_request(format!(
                    "Bundle '{}' must be cheaper per credit than '{}'",
                    large.id, small.id
                )));
            }
        }

        Ok(())
    }
}

/// Builder for constructing a plan catalog.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    plans: HashMap<PlanId, PlanConfig>,
    bundles: Vec<CreditBundle>,
    trial: TrialConfig,
    feature_locks: HashMap<String, PlanId>,
}

impl CatalogBuilder {
    /// Start defining a plan.
    #[must_use]
    pub fn plan(self, id: PlanId) -> PlanBuilder {
        PlanBuilder {
            parent: self,
            id,
            name: LocalizedName::new(id.as_str(), id.as_str()),
            monthly_price: 0,
            yearly_price: 0,
            credits: 0,
            image_credits: 0,
            popular: false,
            features: HashSet::new(),
            limits: PlanLimits::default(),
        }
    }

    /// Add a credit bundle.
    #[must_use]
    pub fn bundle(mut self, id: &str, credits: u32, price: u32, savings: &str) -> Self {
        self.bundles.push(CreditBundle {
            id: id.to_string(),
            credits,
            price,
            savings: savings.to_string(),
        });
        self
    }

    /// Set the trial configuration.
    #[must_use]
    pub fn trial(mut self, bonus_credits: u32, trial_days: u32, trial_plan: PlanId) -> Self {
        self.trial = TrialConfig {
            bonus_credits,
            trial_days,
            trial_plan,
        };
        self
    }

    /// Record the minimum plan that unlocks a feature.
    #[must_use]
    pub fn lock_feature(mut self, feature: &str, required_plan: PlanId) -> Self {
        self.feature_locks.insert(feature.to_string(), required_plan);
        self
    }

    /// Build the catalog.
    #[must_use]
    pub fn build(self) -> PlanCatalog {
        PlanCatalog {
            plans: self.plans,
            bundles: self.bundles,
            trial: self.trial,
            feature_locks: self.feature_locks,
        }
    }

    fn add_plan(mut self, config: PlanConfig) -> Self {
        self.plans.insert(config.id, config);
        self
    }
}

/// Builder for a single plan configuration.
#[derive(Debug)]
pub struct PlanBuilder {
    parent: CatalogBuilder,
    id: PlanId,
    name: LocalizedName,
    monthly_price: u32,
    yearly_price: u32,
    credits: u32,
    image_credits: u32,
    popular: bool,
    features: HashSet<String>,
    limits: PlanLimits,
}

impl PlanBuilder {
    /// Set the localized display name.
    #[must_use]
    pub fn name(mut self, en: &str, ru: &str) -> Self {
        self.name = LocalizedName::new(en, ru);
        self
    }

    /// Set the monthly price.
    #[must_use]
    pub fn monthly_price(mut self, price: u32) -> Self {
        self.monthly_price = price;
        self
    }

    /// Set the yearly price.
    #[must_use]
    pub fn yearly_price(mut self, price: u32) -> Self {
        self.yearly_price = price;
        self
    }

    /// Set the monthly text-generation credit allotment.
    #[must_use]
    pub fn credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Set the monthly image-generation credit allotment.
    #[must_use]
    pub fn image_credits(mut self, credits: u32) -> Self {
        self.image_credits = credits;
        self
    }

    /// Highlight this plan in the pricing UI.
    #[must_use]
    pub fn popular(mut self) -> Self {
        self.popular = true;
        self
    }

    /// Enable feature flags on this plan.
    #[must_use]
    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Enable a single feature flag.
    #[must_use]
    pub fn feature(mut self, feature: &str) -> Self {
        self.features.insert(feature.to_string());
        self
    }

    /// Set the numeric limits.
    #[must_use]
    pub fn limits(mut self, limits: PlanLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Finish this plan and return to the catalog builder.
    #[must_use]
    pub fn done(self) -> CatalogBuilder {
        let config = PlanConfig {
            id: self.id,
            name: self.name,
            monthly_price: self.monthly_price,
            yearly_price: self.yearly_price,
            credits: self.credits,
            image_credits: self.image_credits,
            popular: self.popular,
            features: self.features,
            limits: self.limits,
        };
        self.parent.add_plan(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = PlanCatalog::standard();
        assert_eq!(catalog.plans().len(), 3);
        assert_eq!(catalog.bundles().len(), 3);

        let free = catalog.get(PlanId::Free).unwrap();
        assert_eq!(free.monthly_price, 0);
        assert_eq!(free.credits, 3);
        assert_eq!(free.limits.monthly_generations, 3);

        let pro = catalog.get(PlanId::Pro).unwrap();
        assert!(pro.popular);
        assert_eq!(pro.monthly_price, 15);
        assert_eq!(pro.yearly_price, 126);

        let business = catalog.get(PlanId::Business).unwrap();
        assert!(business.has_feature("teamAccess"));
        assert!(!pro.has_feature("teamAccess"));
    }

    #[test]
    fn test_standard_catalog_is_valid() {
        assert!(PlanCatalog::standard().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_priced_free_plan() {
        let catalog = PlanCatalog::builder()
            .plan(PlanId::Free)
            .monthly_price(5)
            .done()
            .build();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_yearly_at_12x_monthly() {
        let catalog = PlanCatalog::builder()
            .plan(PlanId::Pro)
            .monthly_price(10)
            .yearly_price(120)
            .done()
            .build();
        assert!(catalog.validate().is_err());

        let catalog = PlanCatalog::builder()
            .plan(PlanId::Pro)
            .monthly_price(10)
            .yearly_price(119)
            .done()
            .build();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_decreasing_bundle_unit_price() {
        // 100 credits at 9 => 0.09/credit; 300 at 27 => 0.09/credit (not a discount)
        let catalog = PlanCatalog::builder()
            .bundle("bundle_100", 100, 9, "0%")
            .bundle("bundle_300", 300, 27, "0%")
            .build();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_yearly_savings_percent() {
        let catalog = PlanCatalog::standard();
        // 12 * 15 = 180; (180 - 126) / 180 = 30%
        assert_eq!(catalog.yearly_savings_percent(PlanId::Pro), 30);
        // 12 * 39 = 468; (468 - 327) / 468 = 30.1 -> 30%
        assert_eq!(catalog.yearly_savings_percent(PlanId::Business), 30);
        assert_eq!(catalog.yearly_savings_percent(PlanId::Free), 0);
    }

    #[test]
    fn test_bundle_lookup() {
        let catalog = PlanCatalog::standard();
        let bundle = catalog.bundle("bundle_300").unwrap();
        assert_eq!(bundle.credits, 300);
        assert_eq!(bundle.price, 24);
        assert_eq!(bundle.savings, "20%");
        assert!(catalog.bundle("bundle_999").is_none());
    }

    #[test]
    fn test_plan_id_wire_values() {
        assert_eq!(PlanId::Free.as_str(), "free");
        assert_eq!(PlanId::Pro.as_str(), "pro");
        assert_eq!(PlanId::Business.as_str(), "business");
        assert_eq!("business".parse::<PlanId>().unwrap(), PlanId::Business);
        assert!("enterprise".parse::<PlanId>().is_err());

        let json = serde_json::to_string(&PlanId::Pro).unwrap();
        assert_eq!(json, "\"pro\"");
    }

    #[test]
    fn test_plan_ordering_follows_upgrade_path() {
        assert!(PlanId::Free < PlanId::Pro);
        assert!(PlanId::Pro < PlanId::Business);
    }

    #[test]
    fn test_localized_names() {
        let catalog = PlanCatalog::standard();
        let free = catalog.get(PlanId::Free).unwrap();
        assert_eq!(free.name.get(Language::En), "Free");
        assert_eq!(free.name.get(Language::Ru), "Бесплатный");
    }

    #[test]
    fn test_trial_config() {
        let catalog = PlanCatalog::standard();
        let trial = catalog.trial();
        assert_eq!(trial.bonus_credits, 50);
        assert_eq!(trial.trial_days, 7);
        assert_eq!(trial.trial_plan, PlanId::Pro);
    }
}
