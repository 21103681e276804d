use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::budget::BudgetError;
use crate::error::MenuError;
use crate::llm::LlmErrorKind;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Menu(MenuError),
}

impl From<MenuError> for ApiError {
    fn from(e: MenuError) -> Self {
        Self::Menu(e)
    }
}

impl From<BudgetError> for ApiError {
    fn from(e: BudgetError) -> Self {
        Self::Menu(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Menu(e) => status_for(e),
        }
    }
}

fn status_for(error: &MenuError) -> (StatusCode, &'static str) {
    match error {
        MenuError::DailyCostExceeded { .. } => {
            (StatusCode::TOO_MANY_REQUESTS, "daily_budget_exceeded")
        }
        MenuError::ImageEncoding(_) => (StatusCode::BAD_REQUEST, "invalid_image"),
        MenuError::Llm(e) => match e.kind {
            LlmErrorKind::InvalidCredentials => (StatusCode::BAD_GATEWAY, "model_credentials"),
            LlmErrorKind::InvalidResponse => (StatusCode::BAD_GATEWAY, "model_response"),
            LlmErrorKind::InvalidRequest => (StatusCode::INTERNAL_SERVER_ERROR, "model_request"),
            _ => (StatusCode::BAD_GATEWAY, "model_unavailable"),
        },
        MenuError::Ledger(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ledger"),
        MenuError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "cancelled"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = match &self {
            Self::BadRequest(message) => message.clone(),
            Self::Menu(e) => e.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }
        (status, Json(ErrorBody { code, message })).into_response()
    }
}
