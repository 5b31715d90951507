//! Onboarding preference accumulation.
//!
//! Collected across wizard steps and persisted in one request at the end.
//! Goal selection carries one special rule: the "everything" goal is
//! mutually exclusive with all specific goals.

use serde::{Deserialize, Serialize};

/// Sentinel goal meaning "all content goals". Mutually exclusive with
/// every specific goal.
pub const EVERYTHING_GOAL: &str = "everything";

/// Preferences gathered by the onboarding wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPreferences {
    #[serde(default)]
    pub content_goals: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub business_niche: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub preferred_tone: String,
}

impl OnboardingPreferences {
    /// Toggle a content goal.
    ///
    /// Selecting [`EVERYTHING_GOAL`] replaces all current goals with it
    /// alone. Selecting a specific goal removes the sentinel if present.
    /// Toggling an already-selected goal deselects it.
    pub fn toggle_goal(&mut self, goal: &str) {
        if let Some(pos) = self.content_goals.iter().position(|g| g == goal) {
            self.content_goals.remove(pos);
            return;
        }

        if goal == EVERYTHING_GOAL {
            self.content_goals.clear();
        } else {
            self.content_goals.retain(|g| g != EVERYTHING_GOAL);
        }
        self.content_goals.push(goal.to_string());
    }

    /// Toggle a target platform. No exclusivity rules apply.
    pub fn toggle_platform(&mut self, platform: &str) {
        if let Some(pos) = self.platforms.iter().position(|p| p == platform) {
            self.platforms.remove(pos);
        } else {
            self.platforms.push(platform.to_string());
        }
    }

    /// Whether a goal is currently selected.
    #[must_use]
    pub fn has_goal(&self, goal: &str) -> bool {
        self.content_goals.iter().any(|g| g == goal)
    }

    /// Whether a platform is currently selected.
    #[must_use]
    pub fn has_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_goal_selects_and_deselects() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_goal("sales");
        assert!(prefs.has_goal("sales"));
        prefs.toggle_goal("sales");
        assert!(!prefs.has_goal("sales"));
    }

    #[test]
    fn test_everything_replaces_specific_goals() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_goal("sales");
        prefs.toggle_goal("engagement");
        prefs.toggle_goal(EVERYTHING_GOAL);

        assert_eq!(prefs.content_goals, vec![EVERYTHING_GOAL.to_string()]);
    }

    #[test]
    fn test_specific_goal_removes_everything() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_goal(EVERYTHING_GOAL);
        prefs.toggle_goal("sales");

        assert!(!prefs.has_goal(EVERYTHING_GOAL));
        assert_eq!(prefs.content_goals, vec!["sales".to_string()]);
    }

    #[test]
    fn test_everything_deselects_like_any_goal() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_goal(EVERYTHING_GOAL);
        prefs.toggle_goal(EVERYTHING_GOAL);
        assert!(prefs.content_goals.is_empty());
    }

    #[test]
    fn test_platforms_toggle_independently() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_platform("instagram");
        prefs.toggle_platform("telegram");
        assert!(prefs.has_platform("instagram"));
        assert!(prefs.has_platform("telegram"));

        prefs.toggle_platform("instagram");
        assert!(!prefs.has_platform("instagram"));
        assert!(prefs.has_platform("telegram"));
    }

    #[test]
    fn test_serializes_wire_shape() {
        let mut prefs = OnboardingPreferences::default();
        prefs.toggle_goal("sales");
        prefs.toggle_platform("instagram");
        prefs.business_niche = "coffee shop".to_string();

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["content_goals"][0], "sales");
        assert_eq!(json["platforms"][0], "instagram");
        assert_eq!(json["business_niche"], "coffee shop");
        assert_eq!(json["preferred_tone"], "");
    }
}
