//! Session-scoped client state.
//!
//! Holds the bearer credential and the user's entitlement snapshot for the
//! duration of an authenticated session. Discarded on logout, rebuilt on the
//! next login. The snapshot is read-mostly: after a server-confirmed plan
//! change it is replaced wholesale, never patched field by field.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::billing::plans::PlanId;

/// The user's entitlement snapshot as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// Current subscription tier.
    #[serde(rename = "subscription_plan", default)]
    pub plan: PlanId,
    /// Generations consumed in the current period.
    #[serde(default)]
    pub current_usage: u32,
    /// Explicit monthly limit, when the user record carries one.
    #[serde(default)]
    pub monthly_limit: Option<u32>,
    /// Bonus credits (trial grants, purchased bundles).
    #[serde(default)]
    pub bonus_credits: u32,
    /// Whether the onboarding wizard has been completed.
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl UserSnapshot {
    /// Snapshot for a brand-new free-tier user.
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }
}

/// Session-scoped container for the credential and entitlement snapshot.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<UserSnapshot>,
}

impl Session {
    /// An unauthenticated session. All authenticated calls short-circuit.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session.
    #[must_use]
    pub fn authenticated(token: impl Into<String>, user: UserSnapshot) -> Self {
        Self {
            token: Some(SecretString::new(token.into())),
            user: Some(user),
        }
    }

    /// The bearer credential, if the session is authenticated.
    #[must_use]
    pub fn bearer(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The current entitlement snapshot, if known.
    #[must_use]
    pub fn user(&self) -> Option<&UserSnapshot> {
        self.user.as_ref()
    }

    /// Current plan, defaulting to free when no snapshot is held.
    #[must_use]
    pub fn current_plan(&self) -> PlanId {
        self.user.as_ref().map(|u| u.plan).unwrap_or_default()
    }

    /// Replace the entitlement snapshot wholesale.
    ///
    /// Call this after any server-confirmed plan change.
    pub fn replace_snapshot(&mut self, user: UserSnapshot) {
        self.user = Some(user);
    }

    /// Drop the credential and snapshot.
    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never reveal the credential, even in debug output.
        f.debug_struct("Session")
            .field("authenticated", &self.token.is_some())
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session() {
        let session = Session::anonymous();
        assert!(session.bearer().is_none());
        assert!(session.user().is_none());
        assert_eq!(session.current_plan(), PlanId::Free);
    }

    #[test]
    fn test_authenticated_session() {
        let user = UserSnapshot {
            plan: PlanId::Pro,
            current_usage: 12,
            ..UserSnapshot::default()
        };
        let session = Session::authenticated("tok_abc", user);
        assert!(session.bearer().is_some());
        assert_eq!(session.current_plan(), PlanId::Pro);
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut session = Session::authenticated("tok_abc", UserSnapshot::free());
        session.logout();
        assert!(session.bearer().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_replace_snapshot_wholesale() {
        let mut session = Session::authenticated("tok_abc", UserSnapshot::free());
        session.replace_snapshot(UserSnapshot {
            plan: PlanId::Business,
            current_usage: 0,
            monthly_limit: Some(600),
            bonus_credits: 0,
            onboarding_completed: true,
        });
        assert_eq!(session.current_plan(), PlanId::Business);
        assert_eq!(session.user().unwrap().monthly_limit, Some(600));
    }

    #[test]
    fn test_snapshot_deserializes_backend_shape() {
        let snapshot: UserSnapshot = serde_json::from_str(
            r#"{"subscription_plan":"pro","current_usage":5,"monthly_limit":200,"bonus_credits":50,"onboarding_completed":true}"#,
        )
        .unwrap();
        assert_eq!(snapshot.plan, PlanId::Pro);
        assert_eq!(snapshot.current_usage, 5);
        assert_eq!(snapshot.monthly_limit, Some(200));
        assert_eq!(snapshot.bonus_credits, 50);
        assert!(snapshot.onboarding_completed);
    }

    #[test]
    fn test_snapshot_defaults_for_sparse_records() {
        // Users created before the limit fields existed.
        let snapshot: UserSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.plan, PlanId::Free);
        assert_eq!(snapshot.monthly_limit, None);
        assert_eq!(snapshot.bonus_credits, 0);
    }

    #[test]
    fn test_debug_hides_credential() {
        let session = Session::authenticated("super_secret_token", UserSnapshot::free());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super_secret_token"));
    }
}
