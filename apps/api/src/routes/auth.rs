use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the shared operator password.
pub const PASSWORD_HEADER: &str = "x-access-password";

/// Rejects API requests without the configured password. A no-op when
/// `APP_PASSWORD` is unset.
pub async fn require_password(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.app_password.as_deref() {
        let supplied = request
            .headers()
            .get(PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok());
        if supplied != Some(expected) {
            return Err(AppError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}
