use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::AppError;
use crate::services::firebase::bearer_token;

/// Lets the request through only when its bearer token is accepted by the identity provider.
/// The verified identity is not forwarded to handlers.
#[tracing::instrument(skip_all)]
pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?;

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .map(ToOwned::to_owned)
        .ok_or(AppError::Unauthorized)?;

    match state.verifier.verify(&token).await {
        Ok(user) => tracing::debug!(uid = %user.uid, email = ?user.email, "token verified"),
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}
