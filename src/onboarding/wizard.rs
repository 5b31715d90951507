//! The onboarding wizard state machine.
//!
//! Five linear steps followed by a terminal state. Preferences accumulate
//! locally and are persisted only when the wizard finishes; skipping
//! persists nothing but the completion flag.

use serde::Serialize;

use super::preferences::OnboardingPreferences;
use crate::config::Language;
use crate::error::{PostflowError, Result};

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    Goals,
    Platforms,
    BrandSetup,
    Demo,
    Summary,
    Completed,
}

impl OnboardingStep {
    /// 1-based position for the progress indicator. `Completed` reports the
    /// last step's number.
    #[must_use]
    pub fn step_number(&self) -> u8 {
        match self {
            Self::Goals => 1,
            Self::Platforms => 2,
            Self::BrandSetup => 3,
            Self::Demo => 4,
            Self::Summary | Self::Completed => 5,
        }
    }

    /// Progress fraction in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        f64::from(self.step_number()) / 5.0
    }

    fn next(&self) -> Self {
        match self {
            Self::Goals => Self::Platforms,
            Self::Platforms => Self::BrandSetup,
            Self::BrandSetup => Self::Demo,
            Self::Demo => Self::Summary,
            // The terminal transition is reserved for finish() and skip();
            // plain navigation cannot leave the summary step.
            Self::Summary => Self::Summary,
            Self::Completed => Self::Completed,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            Self::Goals | Self::Completed => None,
            Self::Platforms => Some(Self::Goals),
            Self::BrandSetup => Some(Self::Platforms),
            Self::Demo => Some(Self::BrandSetup),
            Self::Summary => Some(Self::Demo),
        }
    }
}

/// A content generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub content_type: String,
    pub topic: String,
    pub platform: String,
    pub tone: String,
    pub language: String,
}

/// Collaborator that generates content on the backend.
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

/// Collaborator that persists onboarding results.
pub trait OnboardingStore: Send + Sync {
    /// Persist the collected preferences to the user's profile.
    async fn save_preferences(&self, preferences: &OnboardingPreferences) -> Result<()>;

    /// Mark onboarding as completed on the user's record.
    async fn complete_onboarding(&self) -> Result<()>;
}

/// Drives a user through the onboarding steps.
pub struct OnboardingWizard<S: OnboardingStore, G: ContentGenerator> {
    store: S,
    generator: G,
    language: Language,
    step: OnboardingStep,
    preferences: OnboardingPreferences,
    demo_content: Option<String>,
}

impl<S: OnboardingStore, G: ContentGenerator> OnboardingWizard<S, G> {
    /// Start a fresh wizard at the first step.
    #[must_use]
    pub fn new(store: S, generator: G, language: Language) -> Self {
        Self {
            store,
            generator,
            language,
            step: OnboardingStep::Goals,
            preferences: OnboardingPreferences::default(),
            demo_content: None,
        }
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// The injected store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The injected generator.
    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The preferences collected so far.
    #[must_use]
    pub fn preferences(&self) -> &OnboardingPreferences {
        &self.preferences
    }

    /// Mutable access for step forms to record selections.
    pub fn preferences_mut(&mut self) -> &mut OnboardingPreferences {
        &mut self.preferences
    }

    /// The generated demo post, once available.
    #[must_use]
    pub fn demo_content(&self) -> Option<&str> {
        self.demo_content.as_deref()
    }

    /// Advance to the next step.
    ///
    /// No-op at the summary step and once completed: the wizard only
    /// completes through [`Self::finish`] or [`Self::skip`], so navigation
    /// can never bypass persistence.
    pub fn next(&mut self) {
        self.step = self.step.next();
    }

    /// Go back one step. No-op at the first step and once completed.
    pub fn back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Whether the back control should be shown.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.step.previous().is_some()
    }

    /// Whether advancing from the demo step skips generation.
    ///
    /// True only on the demo step when no demo content was produced.
    #[must_use]
    pub fn advancing_skips_generation(&self) -> bool {
        self.step == OnboardingStep::Demo && self.demo_content.is_none()
    }

    /// Skip the wizard entirely.
    ///
    /// Persists only the completion flag, never the partially collected
    /// preferences. The wizard completes locally even when the call fails;
    /// the user is not trapped in onboarding over a flaky network.
    pub async fn skip(&mut self) {
        if let Err(err) = self.store.complete_onboarding().await {
            tracing::warn!(
                target: "postflow::onboarding",
                error = %err,
                "Failed to record onboarding completion on skip"
            );
        }
        self.step = OnboardingStep::Completed;
    }

    /// Generate the demo post from the collected preferences.
    ///
    /// On generation failure a canned localized post is substituted so the
    /// demo step always has something to show.
    pub async fn generate_demo(&mut self) -> &str {
        let request = self.demo_request();
        let content = match self.generator.generate(&request).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(
                    target: "postflow::onboarding",
                    error = %err,
                    "Demo generation failed, using fallback post"
                );
                fallback_demo_post(self.language).to_string()
            }
        };
        self.demo_content = Some(content);
        self.demo_content.as_deref().unwrap_or_default()
    }

    fn demo_request(&self) -> GenerateRequest {
        let topic = if self.preferences.business_niche.trim().is_empty() {
            match self.language {
                Language::En => "A post introducing my business to new followers".to_string(),
                Language::Ru => {
                    "Пост, знакомящий новых подписчиков с моим бизнесом".to_string()
                }
            }
        } else {
            let niche = self.preferences.business_niche.trim();
            match self.language {
                Language::En => format!("An engaging social media post for a {niche} business"),
                Language::Ru => format!("Вовлекающий пост для бизнеса в сфере {niche}"),
            }
        };

        let platform = self
            .preferences
            .platforms
            .first()
            .cloned()
            .unwrap_or_else(|| "instagram".to_string());

        let tone = if self.preferences.preferred_tone.is_empty() {
            "professional".to_string()
        } else {
            self.preferences.preferred_tone.clone()
        };

        GenerateRequest {
            content_type: "social_post".to_string(),
            topic,
            platform,
            tone,
            language: self.language.as_str().to_string(),
        }
    }

    /// Finish the wizard from the summary step.
    ///
    /// Persists the preferences first, then the completion flag. A
    /// preference-save failure is fatal: the completion flag is not
    /// attempted and the wizard stays on the summary step so the user can
    /// retry.
    pub async fn finish(&mut self) -> Result<()> {
        if self.step != OnboardingStep::Summary {
            return Err(PostflowError::bad_request(
                "Onboarding can only be finished from the summary step",
            ));
        }

        self.store.save_preferences(&self.preferences).await?;
        self.store.complete_onboarding().await?;

        self.step = OnboardingStep::Completed;
        tracing::info!(target: "postflow::onboarding", "Onboarding completed");
        Ok(())
    }
}

/// Canned demo post shown when generation fails.
#[must_use]
pub fn fallback_demo_post(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Big news! We are now creating our content with Postflow. \
             Fresh posts, consistent style, and more time for what we love. \
             Stay tuned for what comes next!"
        }
        Language::Ru => {
            "Отличные новости! Теперь мы создаём контент вместе с Postflow. \
             Свежие посты, единый стиль и больше времени на любимое дело. \
             Следите за обновлениями!"
        }
    }
}

/// In-memory store and generator mocks for testing.
#[cfg(any(test, feature = "test-client"))]
pub mod test {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Store that records calls in memory, with per-operation fail switches.
    #[derive(Default)]
    pub struct InMemoryOnboardingStore {
        saved: Mutex<Option<OnboardingPreferences>>,
        completions: AtomicU32,
        fail_save: AtomicBool,
        fail_complete: AtomicBool,
    }

    impl InMemoryOnboardingStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_save(&self) {
            self.fail_save.store(true, Ordering::SeqCst);
        }

        pub fn fail_complete(&self) {
            self.fail_complete.store(true, Ordering::SeqCst);
        }

        /// The preferences persisted by the last save, if any.
        pub fn saved_preferences(&self) -> Option<OnboardingPreferences> {
            self.saved.lock().unwrap().clone()
        }

        /// Number of completion calls issued.
        pub fn completion_count(&self) -> u32 {
            self.completions.load(Ordering::SeqCst)
        }
    }

    impl OnboardingStore for InMemoryOnboardingStore {
        async fn save_preferences(&self, preferences: &OnboardingPreferences) -> Result<()> {
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(PostflowError::service_unavailable("profile service down"));
            }
            *self.saved.lock().unwrap() = Some(preferences.clone());
            Ok(())
        }

        async fn complete_onboarding(&self) -> Result<()> {
            if self.fail_complete.load(Ordering::SeqCst) {
                return Err(PostflowError::service_unavailable("profile service down"));
            }
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Generator that returns a fixed post or fails on demand.
    #[derive(Default)]
    pub struct MockContentGenerator {
        fail: AtomicBool,
        last_request: Mutex<Option<GenerateRequest>>,
    }

    impl MockContentGenerator {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_requests(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        /// The most recent request, for asserting on derived fields.
        pub fn last_request(&self) -> Option<GenerateRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    impl ContentGenerator for MockContentGenerator {
        async fn generate(&self, request: &GenerateRequest) -> Result<String> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(PostflowError::service_unavailable("generator down"));
            }
            Ok(format!("Generated post about: {}", request.topic))
        }
    }
}
