//! The standard catalog and the derivations built on top of it, exercised
//! through the public API the pricing surface consumes.

use postflow::billing::{
    feature_lock, has_feature_access, is_credits_exhausted, is_credits_low, resolve_monthly_limit,
    usage_stats, PlanCatalog, PlanId,
};
use postflow::config::Language;
use postflow::session::UserSnapshot;

#[test]
fn standard_catalog_is_internally_consistent() {
    let catalog = PlanCatalog::standard();
    catalog.validate().unwrap();

    let plans = catalog.plans();
    assert_eq!(plans.len(), 3);
    // Sorted by upgrade order, free first.
    assert_eq!(plans[0].id, PlanId::Free);
    assert_eq!(plans[1].id, PlanId::Pro);
    assert_eq!(plans[2].id, PlanId::Business);

    // Exactly one plan carries the "popular" badge.
    assert_eq!(plans.iter().filter(|p| p.popular).count(), 1);
    assert!(catalog.get(PlanId::Pro).unwrap().popular);
}

#[test]
fn standard_catalog_prices_and_credits() {
    let catalog = PlanCatalog::standard();

    let free = catalog.get(PlanId::Free).unwrap();
    assert_eq!(free.monthly_price, 0);
    assert_eq!(free.credits, 3);

    let pro = catalog.get(PlanId::Pro).unwrap();
    assert_eq!((pro.monthly_price, pro.yearly_price), (15, 126));
    assert_eq!((pro.credits, pro.image_credits), (200, 30));

    let business = catalog.get(PlanId::Business).unwrap();
    assert_eq!((business.monthly_price, business.yearly_price), (39, 327));
    assert_eq!(business.limits.monthly_generations, 600);
}

#[test]
fn yearly_savings_match_published_discounts() {
    let catalog = PlanCatalog::standard();
    assert_eq!(catalog.yearly_savings_percent(PlanId::Pro), 30);
    assert_eq!(catalog.yearly_savings_percent(PlanId::Business), 30);
    assert_eq!(catalog.yearly_savings_percent(PlanId::Free), 0);
}

#[test]
fn bundle_unit_price_decreases_with_size() {
    let catalog = PlanCatalog::standard();
    let bundles = catalog.bundles();
    assert_eq!(bundles.len(), 3);

    for pair in bundles.windows(2) {
        // price/credits strictly decreasing, compared without division.
        assert!(
            u64::from(pair[0].price) * u64::from(pair[1].credits)
                > u64::from(pair[1].price) * u64::from(pair[0].credits)
        );
    }

    assert_eq!(catalog.bundle("bundle_300").unwrap().credits, 300);
    assert!(catalog.bundle("bundle_9000").is_none());
}

#[test]
fn plan_names_are_localized() {
    let catalog = PlanCatalog::standard();

    let free = catalog.get(PlanId::Free).unwrap();
    assert_eq!(free.name.get(Language::En), "Free");
    assert_eq!(free.name.get(Language::Ru), "Бесплатный");

    let business = catalog.get(PlanId::Business).unwrap();
    assert_eq!(business.name.get(Language::En), "Business");
    assert_eq!(business.name.get(Language::Ru), "Бизнес");

    // "Pro" is a brand name and reads the same in both locales.
    let pro = catalog.get(PlanId::Pro).unwrap();
    assert_eq!(pro.name.get(Language::En), pro.name.get(Language::Ru));
}

#[test]
fn gated_features_point_at_the_unlocking_plan() {
    let catalog = PlanCatalog::standard();

    assert!(has_feature_access(&catalog, PlanId::Free, "basicGeneration"));
    assert!(!has_feature_access(&catalog, PlanId::Free, "analytics"));

    let lock = feature_lock(&catalog, PlanId::Free, "analytics").unwrap();
    assert_eq!(lock.required_plan, PlanId::Pro);

    let lock = feature_lock(&catalog, PlanId::Pro, "batchGeneration").unwrap();
    assert_eq!(lock.required_plan, PlanId::Business);

    assert!(feature_lock(&catalog, PlanId::Business, "batchGeneration").is_none());
}

#[test]
fn exhausted_free_user_sees_upgrade_state() {
    let catalog = PlanCatalog::standard();
    let user = UserSnapshot {
        plan: PlanId::Free,
        current_usage: 3,
        monthly_limit: None,
        bonus_credits: 0,
        onboarding_completed: true,
    };

    assert_eq!(resolve_monthly_limit(&user, &catalog), 3);
    let stats = usage_stats(&user, &catalog);
    assert_eq!(stats.remaining_credits, 0);
    assert_eq!(stats.percent_used, 100.0);
    assert!(is_credits_exhausted(&user, &catalog));
    assert!(!is_credits_low(&user, &catalog));
}

#[test]
fn pro_user_near_limit_sees_low_credit_warning() {
    let catalog = PlanCatalog::standard();
    let user = UserSnapshot {
        plan: PlanId::Pro,
        current_usage: 195,
        monthly_limit: None,
        bonus_credits: 0,
        onboarding_completed: true,
    };

    let stats = usage_stats(&user, &catalog);
    assert_eq!(stats.remaining_credits, 5);
    assert!(is_credits_low(&user, &catalog));
    assert!(!is_credits_exhausted(&user, &catalog));
}

#[test]
fn bonus_credits_lift_user_out_of_exhaustion() {
    let catalog = PlanCatalog::standard();
    let user = UserSnapshot {
        plan: PlanId::Free,
        current_usage: 3,
        monthly_limit: None,
        bonus_credits: 50,
        onboarding_completed: false,
    };

    let stats = usage_stats(&user, &catalog);
    assert_eq!(stats.remaining_credits, 50);
    assert!(!is_credits_exhausted(&user, &catalog));
    assert!(!is_credits_low(&user, &catalog));
}
