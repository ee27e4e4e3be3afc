use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use plate_share_store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Token not found.")]
    Unauthorized,

    #[error("`{0}` is not a valid identifier")]
    InvalidId(String),

    #[error("`quantity` must be a number")]
    InvalidQuantity,

    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store operation failed")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    message: String,
    status: u16,
    #[serde(rename = "statusText")]
    status_text: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if let AppError::Store(source) = &self {
            tracing::error!(error = %source, "store operation failed");
        }

        let code = self.status_code();

        let message = Json(ErrorBody {
            success: false,
            code: self.error_code(),
            message: self.to_string(),
            status: code.as_u16(),
            status_text: code.canonical_reason().unwrap_or_default().to_string(),
        });

        (code, message).into_response()
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidId(_) | AppError::InvalidQuantity => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(rejection) => rejection.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidId(_) => "invalid_id",
            AppError::InvalidQuantity => "invalid_quantity",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::NotFound(_) => "not_found",
            AppError::Store(_) => "store_error",
        }
    }
}
