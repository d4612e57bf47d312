//! Access gate: per-view authorization decisions.
//!
//! The gate is stateless: every evaluation re-reads the session store, so
//! a logout or role change takes effect on the very next navigation
//! attempt. A denied navigation is not an error - it is a redirect
//! decision the presentation layer follows silently.

use copperpot_core::Role;

use crate::session::SessionStore;

/// What a navigation target requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone may enter (login, register, landing).
    Public,
    /// Any authenticated session may enter.
    RequireAuth,
    /// Only an admin session may enter.
    RequireAdmin,
}

/// Classification of the session against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    /// No token present.
    Unauthenticated,
    /// Token present but the role does not satisfy the policy.
    AuthenticatedInsufficient,
    /// Token present and the role satisfies the policy.
    AuthenticatedOk,
}

/// What the presentation layer should do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested view.
    Allow,
    /// Redirect to the login view.
    RedirectToLogin,
    /// Redirect to the default landing view.
    RedirectToLanding,
}

/// Evaluate a navigation attempt against the current session.
#[must_use]
pub fn evaluate(sessions: &SessionStore, policy: AccessPolicy) -> GateDecision {
    match classify(sessions, policy) {
        AccessState::AuthenticatedOk => GateDecision::Allow,
        AccessState::Unauthenticated => GateDecision::RedirectToLogin,
        AccessState::AuthenticatedInsufficient => GateDecision::RedirectToLanding,
    }
}

/// Classify the session against a policy without deciding a redirect.
#[must_use]
pub fn classify(sessions: &SessionStore, policy: AccessPolicy) -> AccessState {
    let required = match policy {
        AccessPolicy::Public => return AccessState::AuthenticatedOk,
        AccessPolicy::RequireAuth => Role::Customer,
        AccessPolicy::RequireAdmin => Role::Admin,
    };

    let Some(session) = sessions.current() else {
        return AccessState::Unauthenticated;
    };

    if session.role.satisfies(required) {
        AccessState::AuthenticatedOk
    } else {
        AccessState::AuthenticatedInsufficient
    }
}
