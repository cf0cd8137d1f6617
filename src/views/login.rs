//! Login view

use super::{lock, InFlight, Slot, ViewContext, ViewError, ViewResult};
use crate::api::LoginRequest;
use crate::guard::Route;
use crate::models::resolve_upload_url;
use crate::session::{Role, SessionGrant};
use std::sync::Mutex;

/// Shown when the backend gives no reason for a failed login
pub const LOGIN_FALLBACK_ERROR: &str = "Invalid credentials or server error";

/// Branding shown above the login form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Branding {
    /// Fully resolved logo URL, if one is configured
    pub image_url: Option<String>,
    pub theme: Option<String>,
}

#[derive(Default)]
struct LoginState {
    branding: Slot<Branding>,
    error: Option<String>,
}

/// Login form controller
pub struct LoginView {
    ctx: ViewContext,
    state: Mutex<LoginState>,
    in_flight: InFlight,
}

impl LoginView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(LoginState::default()),
            in_flight: InFlight::new(),
        }
    }

    /// Best-effort branding fetch; the form is usable whatever happens here
    pub async fn mount(&self) {
        let base_url = self.ctx.api.base_url().to_string();
        let result = self.ctx.api.email_config().await.map(|config| Branding {
            image_url: config
                .login_image_url
                .filter(|url| !url.is_empty())
                .map(|url| resolve_upload_url(&base_url, &url)),
            theme: config.ui_theme,
        });
        lock(&self.state).branding = Slot::from_result(result, "login branding");
    }

    pub fn branding(&self) -> Slot<Branding> {
        lock(&self.state).branding.clone()
    }

    /// Last error shown under the form
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Submit credentials; on success the session is written and the next
    /// view is returned
    pub async fn submit(&self, email: &str, password: &str) -> ViewResult<Route> {
        let _guard = self.in_flight.begin("login")?;

        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.ctx.api.login(&credentials).await {
            Ok(response) => {
                self.ctx.session.sign_in(&SessionGrant {
                    token: response.token,
                    supplier_id: response.user.id,
                    supplier_name: response.user.name,
                    role: Role::from_claim(response.user.role.as_deref()),
                })?;
                lock(&self.state).error = None;
                Ok(Route::Dashboard)
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                lock(&self.state).error = Some(e.user_message(LOGIN_FALLBACK_ERROR));
                Err(ViewError::Api(e))
            }
        }
    }
}
