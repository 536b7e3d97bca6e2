//! User accounts and the payloads that create or authenticate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::types::UserId;
use crate::validation::rules;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Subset of [`User`] exposed to unauthenticated callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "rules::validate_username"))]
    pub user_name: String,
    #[validate(custom(function = "rules::validate_email"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
}

/// Privileged account creation; may attach roles by name.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "rules::validate_username"))]
    pub user_name: String,
    #[validate(custom(function = "rules::validate_email"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(request: RegisterRequest) -> Self {
        Self {
            user_name: request.user_name,
            email: request.email,
            password: request.password,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Also issue a bearer token.
    #[serde(default)]
    pub with_jwt: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password; required when changing your own password.
    #[serde(default)]
    pub password: Option<String>,
    #[validate(custom(function = "rules::validate_password"))]
    pub next_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicUserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn register_request_reads_camel_case() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "userName": "alice",
            "email": "alice@x.com",
            "password": "LongEnoughPw1"
        }))
        .unwrap();
        assert_eq!(request.user_name, "alice");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn register_request_reports_each_bad_field() {
        let request = RegisterRequest {
            user_name: "1x".into(),
            email: "nope".into(),
            password: "short".into(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn login_query_defaults_to_no_token() {
        let query: LoginQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!query.with_jwt);
        let query: LoginQuery = serde_json::from_value(serde_json::json!({"withJwt": true})).unwrap();
        assert!(query.with_jwt);
    }

    #[test]
    fn user_serializes_snake_case_fields() {
        let now = Utc::now();
        let user = User {
            user_id: UserId::from("abc"),
            user_name: "alice".into(),
            email: "alice@x.com".into(),
            created_at: now,
            modified_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_name"], "alice");
        assert_eq!(json["user_id"], "abc");
        let public = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(public.get("email").is_none());
    }
}
