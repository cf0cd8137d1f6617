//! # Supplier Portal
//!
//! Client for a procurement portal backend. Suppliers register, log in, see
//! open procurement requests and submit quotes; administrators approve
//! suppliers, track compliance, manage SMTP settings and push ERP imports.
//!
//! ## Modules
//!
//! - [`api`]: transport seam, JSON client and typed backend routes
//! - [`session`]: persisted session fields and quote history
//! - [`guard`]: navigation rules for the portal's views
//! - [`views`]: view controllers (login, register, dashboard, admin)
//! - [`models`]: records exchanged with the backend
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use supplier_portal::session::{FileStore, Session};
//! use supplier_portal::views::{Confirmer, LoginView, Notifier, ViewContext};
//!
//! struct Stderr;
//!
//! impl Notifier for Stderr {
//!     fn alert(&self, message: &str) {
//!         eprintln!("{}", message);
//!     }
//! }
//!
//! impl Confirmer for Stderr {
//!     fn confirm(&self, _prompt: &str) -> bool {
//!         false
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = supplier_portal::api::connect("http://localhost:8080/api", Duration::from_secs(30))?;
//!     let session = Session::new(Arc::new(FileStore::open("session.json")?));
//!     let ctx = ViewContext::new(api, session, Arc::new(Stderr), Arc::new(Stderr));
//!
//!     let mut login = LoginView::new(ctx);
//!     login.mount().await;
//!     let next = login.submit("ops@acme.test", "secret").await?;
//!     println!("Continue at {}", next);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod guard;
pub mod models;
pub mod session;
pub mod views;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiError, ApiResult, HttpTransport, PortalApi, Transport};

pub use config::{Config, ConfigError, LoadReport, LoggingConfig};

pub use guard::{guard_by_token, AccessPolicy, Navigation, Route, RouteGuard};

pub use models::{
    ComplianceFlag, ComplianceUpdate, EmailConfig, ErpItem, ImportResponse, NewOffer,
    NewSupplier, Offer, ProcurementRequest, Supplier,
};

pub use session::{FileStore, KeyValueStore, MemoryStore, Role, Session, StoreError};

pub use views::{
    AdminView, Confirmer, DashboardView, LoginView, Notifier, RegisterView, Slot, ViewContext,
    ViewError, ViewResult,
};
