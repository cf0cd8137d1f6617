//! View Controllers
//!
//! Each view owns its local state, loads its data on mount and runs one
//! mutating call per action followed by a re-fetch of what that call touched.
//!
//! Shared pieces live here:
//! - [`Slot`]: load state of one independent fetch
//! - [`InFlight`]: rejects a second run of an action that has not settled
//! - [`Notifier`] / [`Confirmer`]: user-facing alerts and confirmations
//! - [`ViewContext`]: API handle, session and UI callbacks handed to views

mod admin;
mod dashboard;
mod login;
mod register;
mod shell;

pub use admin::{simulated_items, ActivityLog, AdminStats, AdminView};
pub use dashboard::{DashboardView, QuoteForm, RequestGate, DEFAULT_ATTACHMENT, DEFAULT_DELIVERY};
pub use login::{Branding, LoginView, LOGIN_FALLBACK_ERROR};
pub use register::{RegisterForm, RegisterView};
pub use shell::sync_theme;

use crate::api::{ApiError, ApiResult, PortalApi};
use crate::session::{Session, StoreError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Outcome errors of view actions
#[derive(Error, Debug)]
pub enum ViewError {
    /// Form rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// Same action still running
    #[error("Action already in progress: {0}")]
    Busy(String),

    /// Session lacks a field the action needs
    #[error("Session error: {0}")]
    Session(String),

    /// User declined a confirmation
    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Load state of one independent fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Slot<T> {
    /// Convert a fetch result, logging failures under `what`
    pub fn from_result(result: ApiResult<T>, what: &str) -> Self {
        match result {
            Ok(value) => Slot::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load {}", what);
                Slot::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }

    /// Replace with a fresh result, keeping the previous value on failure
    pub fn refresh(&mut self, result: ApiResult<T>, what: &str) {
        match result {
            Ok(value) => *self = Slot::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh {}", what);
                if !matches!(self, Slot::Ready(_)) {
                    *self = Slot::Failed(e.to_string());
                }
            }
        }
    }
}

impl<T> Slot<Vec<T>> {
    /// Items when loaded, empty otherwise
    pub fn items(&self) -> &[T] {
        self.ready().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Names of actions currently running
///
/// Cloning shares the same set.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `action` as running; `Busy` if it already is
    pub fn begin(&self, action: &str) -> ViewResult<InFlightGuard> {
        if !lock(&self.running).insert(action.to_string()) {
            tracing::debug!(action, "Duplicate submission ignored");
            return Err(ViewError::Busy(action.to_string()));
        }

        Ok(InFlightGuard {
            running: Arc::clone(&self.running),
            action: action.to_string(),
        })
    }

    pub fn is_running(&self, action: &str) -> bool {
        lock(&self.running).contains(action)
    }
}

/// Clears the action when dropped
pub struct InFlightGuard {
    running: Arc<Mutex<HashSet<String>>>,
    action: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.running).remove(&self.action);
    }
}

/// Lock view state; a panic in another holder does not invalidate it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Blocking user-facing messages
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Yes/no questions put to the user
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Dependencies shared by all views
#[derive(Clone)]
pub struct ViewContext {
    pub api: PortalApi,
    pub session: Session,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
}

impl ViewContext {
    pub fn new(
        api: PortalApi,
        session: Session,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            confirmer,
        }
    }

    pub(crate) fn alert(&self, message: &str) {
        self.notifier.alert(message);
    }

    pub(crate) fn confirm(&self, prompt: &str) -> bool {
        self.confirmer.confirm(prompt)
    }
}
