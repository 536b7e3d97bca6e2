//! Domain error taxonomy shared by repositories, services and middleware.

use serde::Serialize;
use thiserror::Error;

/// Which guarded operation refused the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialCode {
    RoleCreate,
    RoleRead,
    RoleDelete,
    PermissionRead,
    PermissionCreate,
    UserMgmt,
    UserCreate,
}

impl DenialCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialCode::RoleCreate => "ROLE_CREATE_DENIED",
            DenialCode::RoleRead => "ROLE_READ_DENIED",
            DenialCode::RoleDelete => "ROLE_DELETE_DENIED",
            DenialCode::PermissionRead => "PERMISSION_READ_DENIED",
            DenialCode::PermissionCreate => "PERMISSION_CREATE_DENIED",
            DenialCode::UserMgmt => "USER_MGMT_DENIED",
            DenialCode::UserCreate => "USER_CREATE_DENIED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),
    #[error("missing permission `{permission}`")]
    PermissionDenied {
        code: DenialCode,
        permission: &'static str,
    },
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("authenticated route reached without a resolved user")]
    MissingContext,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    pub fn denied(code: DenialCode, permission: &'static str) -> Self {
        ServiceError::PermissionDenied { code, permission }
    }

    /// True for unique-constraint violations reported by Postgres.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            ServiceError::Database(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_codes_are_distinct() {
        let codes = [
            DenialCode::RoleCreate,
            DenialCode::RoleRead,
            DenialCode::RoleDelete,
            DenialCode::PermissionRead,
            DenialCode::PermissionCreate,
            DenialCode::UserMgmt,
            DenialCode::UserCreate,
        ];
        let unique: std::collections::HashSet<_> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn validation_message_joins_entries() {
        let err = ServiceError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation failed: a; b");
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        let err = ServiceError::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation());
    }
}
