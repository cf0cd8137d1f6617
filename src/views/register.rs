//! Supplier registration view

use super::{InFlight, ViewContext, ViewError, ViewResult};
use crate::guard::Route;
use crate::models::NewSupplier;
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;

const MISMATCH_MESSAGE: &str = "Passwords do not match";
const SUCCESS_MESSAGE: &str =
    "Thank you for registering on our portal. You will receive an answer shortly.";
const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Registration form fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Local checks only; uniqueness of the email is left to the backend
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("contact", &self.contact),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("Field '{}' is required", field));
        }
        if !email_pattern().is_match(self.email.trim()) {
            return Err(format!("Invalid email address: {}", self.email));
        }
        if self.password != self.confirm_password {
            return Err(MISMATCH_MESSAGE.to_string());
        }
        Ok(())
    }

    fn to_payload(&self) -> NewSupplier {
        NewSupplier {
            name: self.name.trim().to_string(),
            contact: self.contact.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            password_hash: self.password.clone(),
            created_at: Utc::now()
                .naive_utc()
                .format(crate::models::ERP_TIMESTAMP_FORMAT)
                .to_string(),
            documents: String::new(),
            active: false,
            is_reviewed: false,
            is_approved: false,
            is_audited: false,
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Registration controller
pub struct RegisterView {
    ctx: ViewContext,
    in_flight: InFlight,
}

impl RegisterView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            in_flight: InFlight::new(),
        }
    }

    /// Validate and send the registration; returns the login route on success
    pub async fn submit(&self, form: &RegisterForm) -> ViewResult<Route> {
        if let Err(message) = form.validate() {
            self.ctx.alert(&message);
            return Err(ViewError::Validation(message));
        }

        let _guard = self.in_flight.begin("register")?;

        match self.ctx.api.register(&form.to_payload()).await {
            Ok(()) => {
                tracing::info!(email = %form.email, "Supplier registered");
                self.ctx.alert(SUCCESS_MESSAGE);
                Ok(Route::Login)
            }
            Err(e) => {
                tracing::error!(error = %e, "Registration failed");
                // Duplicate email is reported verbatim
                let message = if e.is_conflict() {
                    e.user_message(SERVER_ERROR_MESSAGE)
                } else {
                    SERVER_ERROR_MESSAGE.to_string()
                };
                self.ctx.alert(&message);
                Err(ViewError::Api(e))
            }
        }
    }
}
