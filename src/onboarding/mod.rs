//! First-run onboarding: preference collection and the wizard state machine.

pub mod preferences;
pub mod wizard;

pub use preferences::{OnboardingPreferences, EVERYTHING_GOAL};
pub use wizard::{
    fallback_demo_post, ContentGenerator, GenerateRequest, OnboardingStep, OnboardingStore,
    OnboardingWizard,
};
