//! Typed session context
//!
//! Views never touch raw keys; they go through [`Session`].

use super::store::{KeyValueStore, StoreResult};
use std::sync::Arc;

const TOKEN_KEY: &str = "token";
const SUPPLIER_ID_KEY: &str = "supplier_id";
const SUPPLIER_NAME_KEY: &str = "supplier_name";
const THEME_KEY: &str = "theme";
const ROLE_KEY: &str = "role";

/// Theme applied before the backend branding is known
pub const DEFAULT_THEME: &str = "dark";

/// Capability claim carried by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }

    /// Parse a role claim; anything unrecognised is a plain supplier
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(|c| c.trim().to_lowercase()).as_deref() {
            Some("admin") | Some("administrator") => Role::Admin,
            _ => Role::Supplier,
        }
    }
}

/// Fields written on successful login
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGrant {
    pub token: String,
    pub supplier_id: i32,
    pub supplier_name: String,
    pub role: Role,
}

/// Typed accessor over the persisted session fields
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Stored supplier id as written, even if it does not parse
    pub fn supplier_id_raw(&self) -> Option<String> {
        self.store.get(SUPPLIER_ID_KEY)
    }

    /// Stored supplier id; `None` when absent, unparsable or zero
    pub fn supplier_id(&self) -> Option<i32> {
        self.supplier_id_raw()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|id| *id != 0)
    }

    pub fn supplier_name(&self) -> Option<String> {
        self.store.get(SUPPLIER_NAME_KEY)
    }

    pub fn role(&self) -> Role {
        Role::from_claim(self.store.get(ROLE_KEY).as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.has_token() && self.role() == Role::Admin
    }

    pub fn theme(&self) -> String {
        self.store
            .get(THEME_KEY)
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    pub fn set_theme(&self, theme: &str) -> StoreResult<()> {
        self.store.set(THEME_KEY, theme)
    }

    /// Persist a successful login
    pub fn sign_in(&self, grant: &SessionGrant) -> StoreResult<()> {
        self.store.set(TOKEN_KEY, &grant.token)?;
        self.store
            .set(SUPPLIER_ID_KEY, &grant.supplier_id.to_string())?;
        self.store.set(SUPPLIER_NAME_KEY, &grant.supplier_name)?;
        self.store.set(ROLE_KEY, grant.role.as_str())?;

        tracing::info!(
            supplier_id = grant.supplier_id,
            role = grant.role.as_str(),
            "Session started"
        );
        Ok(())
    }

    /// Drop the credential; supplier id, name, theme and quote history stay
    pub fn sign_out(&self) -> StoreResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(ROLE_KEY)?;
        tracing::info!("Session ended");
        Ok(())
    }

    /// Request ids this supplier already quoted, in recording order
    pub fn load_quoted(&self, supplier_id: i32) -> Vec<i32> {
        let Some(raw) = self.store.get(&quotes_key(supplier_id)) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<i32>>(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(supplier_id, error = %e, "Corrupt quote history, ignoring");
                Vec::new()
            }
        }
    }

    /// Append `request_id` to the supplier's quote history if absent
    ///
    /// Returns the updated list. Never removes entries.
    pub fn record_quoted(&self, supplier_id: i32, request_id: i32) -> StoreResult<Vec<i32>> {
        let mut ids = self.load_quoted(supplier_id);
        if !ids.contains(&request_id) {
            ids.push(request_id);
            self.store
                .set(&quotes_key(supplier_id), &serde_json::to_string(&ids)?)?;
        }
        Ok(ids)
    }
}

fn quotes_key(supplier_id: i32) -> String {
    format!("quotes_{}", supplier_id)
}
