use serde::Serialize;
use utoipa::ToSchema;

pub mod auth;
pub mod authz;
pub mod health;
pub mod users;

/// Body for operations that only report completion.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
