//! App shell
//!
//! Applies the cached theme at start-up and then refreshes it from the
//! backend branding without blocking anything on that fetch.

use super::ViewContext;

/// Return the theme to apply now and persist any theme the backend reports
///
/// The cached theme (default `dark`) is returned when the backend is
/// unreachable or has no `ui_theme`.
pub async fn sync_theme(ctx: &ViewContext) -> String {
    let cached = ctx.session.theme();

    match ctx.api.email_config().await {
        Ok(config) => match config.ui_theme.filter(|t| !t.is_empty()) {
            Some(theme) => {
                if let Err(e) = ctx.session.set_theme(&theme) {
                    tracing::warn!(error = %e, "Could not cache theme");
                }
                theme
            }
            None => cached,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Could not sync global theme, using cache");
            cached
        }
    }
}
