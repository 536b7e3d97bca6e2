use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

pub mod service;

pub use service::{DenialCode, ServiceError, ServiceResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Human-readable login failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Registration rejection summary.
    #[serde(rename = "errMsg", skip_serializing_if = "Option::is_none")]
    pub err_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    /// Login failure; never says which credential was wrong.
    AuthFailed,
    Forbidden {
        message: String,
        code: &'static str,
    },
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
    /// Registration input rejected; reported as 403.
    RegistrationRejected(Vec<String>),
}

impl AppError {
    /// A register body that could not be read as JSON.
    pub fn from_register_body(rejection: JsonRejection) -> Self {
        tracing::info!(reason = %rejection.body_text(), "registration body rejected");
        AppError::RegistrationRejected(vec![format!(
            "invalid request body: {}",
            rejection.body_text()
        )])
    }

    /// A login body that could not be read as JSON.
    pub fn from_login_body(rejection: JsonRejection) -> Self {
        tracing::info!(reason = %rejection.body_text(), "login body rejected");
        AppError::AuthFailed
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut message = None;
        let mut err_msg = None;
        let (status, error_message, code, details) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED", None),
            AppError::AuthFailed => {
                let text = "Invalid username or password".to_string();
                message = Some(text.clone());
                (StatusCode::UNAUTHORIZED, text, "AUTH_FAILED", None)
            }
            AppError::Forbidden { message, code } => (StatusCode::FORBIDDEN, message, code, None),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR",
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::RegistrationRejected(errors) => {
                let text = errors.join("; ");
                err_msg = Some(text.clone());
                (
                    StatusCode::FORBIDDEN,
                    text,
                    "REGISTRATION_REJECTED",
                    Some(serde_json::json!({ "errors": errors })),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: code.to_string(),
            message,
            err_msg,
            details,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(entity) => AppError::NotFound(format!("{} not found", entity)),
            ServiceError::InvalidPassword => {
                AppError::Forbidden {
                    message: "Current password is incorrect".to_string(),
                    code: "INVALID_PASSWORD",
                }
            }
            ServiceError::InvalidToken(_) => AppError::Unauthorized("Invalid token".to_string()),
            ServiceError::PermissionDenied { code, permission } => {
                tracing::info!(denial = code.as_str(), permission, "permission denied");
                AppError::Forbidden {
                    message: "Permission denied".to_string(),
                    code: code.as_str(),
                }
            }
            ServiceError::Validation(errors) => AppError::Validation(errors),
            ServiceError::MissingContext => AppError::InternalServerError(anyhow::anyhow!(
                "authenticated route reached without a resolved user"
            )),
            other @ (ServiceError::Database(_) | ServiceError::Hashing(_)) => {
                AppError::InternalServerError(other.into())
            }
        }
    }
}
