//! SMTP / branding configuration managed from the admin view

use serde::{Deserialize, Serialize};

/// Placeholder the backend returns instead of the stored SMTP password
pub const PASSWORD_MASK: &str = "********";

/// Email configuration (`GET/POST /admin/config/email`)
///
/// `ui_theme` and `login_image_url` are also read by the login view and the
/// app shell as branding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: i32,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub smtp_from: String,
    #[serde(default)]
    pub ui_theme: Option<String>,
    #[serde(default)]
    pub login_image_url: Option<String>,
}

fn default_smtp_port() -> i32 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_user: String::new(),
            smtp_password: String::new(),
            smtp_from: String::new(),
            ui_theme: None,
            login_image_url: None,
        }
    }
}

impl EmailConfig {
    /// True when the password field still holds the server mask
    pub fn password_is_masked(&self) -> bool {
        self.smtp_password == PASSWORD_MASK
    }
}

/// Resolve a stored file name to a link under `{base}/uploads/`
///
/// Absolute `http(s)` URLs are returned unchanged.
pub fn resolve_upload_url(base_url: &str, name: &str) -> String {
    if name.starts_with("http") {
        name.to_string()
    } else {
        format!("{}/uploads/{}", base_url.trim_end_matches('/'), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: EmailConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.smtp_port, 587);
        assert!(config.ui_theme.is_none());
    }

    #[test]
    fn test_resolve_upload_url() {
        assert_eq!(
            resolve_upload_url("http://localhost:8080/api/", "logo.png"),
            "http://localhost:8080/api/uploads/logo.png"
        );
        assert_eq!(
            resolve_upload_url("http://localhost:8080/api", "https://cdn.test/logo.png"),
            "https://cdn.test/logo.png"
        );
    }
}
