// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP error responses.

use axum::{
    Json,
    extract::{Request, State as AxumState},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use marquee_api::{ApiError, record_log};
use marquee_domain::LogLevel;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::AppState;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error message.
    pub message: String,
}

impl HttpError {
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }
}

/// Message of a 5xx response, carried to [`record_server_errors`].
#[derive(Debug, Clone)]
struct ServerErrorMessage(String);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let server_error: Option<ServerErrorMessage> = self
            .status
            .is_server_error()
            .then(|| ServerErrorMessage(self.message.clone()));

        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        let mut response: Response = (self.status, body).into_response();
        if let Some(message) = server_error {
            response.extensions_mut().insert(message);
        }
        response
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error while handling request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Writes every 5xx response to the operational log.
///
/// Runs outside the handler so the persistence lock is free again.
pub async fn record_server_errors(
    AxumState(app_state): AxumState<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let context: String = format!("{} {}", request.method(), request.uri().path());
    let response: Response = next.run(request).await;

    if response.status().is_server_error() {
        let message: String = response
            .extensions()
            .get::<ServerErrorMessage>()
            .map_or_else(
                || response.status().to_string(),
                |m| m.0.clone(),
            );
        warn!(status = %response.status(), context = %context, "Server error response");

        let mut persistence = app_state.persistence.lock().await;
        record_log(
            &mut persistence,
            LogLevel::Error,
            "server",
            &message,
            Some(&context),
        );
    }

    response
}
