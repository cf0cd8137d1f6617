//! Route Guard
//!
//! Decides, per navigation, whether a view is reachable.
//!
//! [`guard_by_token`] is the token-only decision: a pure function of whether a
//! token is stored. It leaves `/admin` open to everyone. [`RouteGuard`] adds an
//! [`AccessPolicy`] for the admin view; the default policy demands an admin
//! role claim on the session.

use crate::session::Session;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Views of the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('/') {
            "" => Ok(Route::Root),
            "/login" | "login" => Ok(Route::Login),
            "/register" | "register" => Ok(Route::Register),
            "/dashboard" | "dashboard" => Ok(Route::Dashboard),
            "/admin" | "admin" => Ok(Route::Admin),
            other => Err(format!("unknown route: {}", other)),
        }
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Render the requested view
    Allow(Route),
    /// Go to another view instead
    Redirect(Route),
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Allow(_))
    }

    /// The view that ends up rendered
    pub fn target(&self) -> Route {
        match self {
            Navigation::Allow(route) | Navigation::Redirect(route) => *route,
        }
    }
}

/// Token-only guard
pub fn guard_by_token(route: Route, has_token: bool) -> Navigation {
    match (route, has_token) {
        (Route::Login | Route::Register, true) => Navigation::Redirect(Route::Dashboard),
        (Route::Dashboard, false) => Navigation::Redirect(Route::Login),
        (Route::Root, true) => Navigation::Redirect(Route::Dashboard),
        (Route::Root, false) => Navigation::Redirect(Route::Login),
        (route, _) => Navigation::Allow(route),
    }
}

/// Who may open the admin view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// Anyone (token-only guard behaviour)
    Open,
    /// Any logged-in user
    Token,
    /// Logged-in users carrying the admin role claim
    #[default]
    Role,
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(AccessPolicy::Open),
            "token" => Ok(AccessPolicy::Token),
            "role" => Ok(AccessPolicy::Role),
            other => Err(format!("unknown admin policy: {}", other)),
        }
    }
}

/// Navigation guard bound to an admin access policy
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard {
    policy: AccessPolicy,
}

impl RouteGuard {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    pub fn navigate(&self, route: Route, session: &Session) -> Navigation {
        let has_token = session.has_token();

        let decision = match route {
            Route::Admin => self.admin(has_token, session.is_admin()),
            other => guard_by_token(other, has_token),
        };

        if let Navigation::Redirect(target) = decision {
            tracing::debug!(from = %route, to = %target, "Navigation redirected");
        }
        decision
    }

    fn admin(&self, has_token: bool, is_admin: bool) -> Navigation {
        let fallback = if has_token {
            Route::Dashboard
        } else {
            Route::Login
        };

        match self.policy {
            AccessPolicy::Open => Navigation::Allow(Route::Admin),
            AccessPolicy::Token if has_token => Navigation::Allow(Route::Admin),
            AccessPolicy::Role if is_admin => Navigation::Allow(Route::Admin),
            AccessPolicy::Token | AccessPolicy::Role => Navigation::Redirect(fallback),
        }
    }
}
