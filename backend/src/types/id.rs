//! Typed ID wrappers for compile-time type safety.
//!
//! Users are keyed by an opaque random string; roles, permissions and login
//! records use database-assigned serial keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::utils::id_gen;

/// Length of generated user identifiers.
pub const USER_ID_LEN: usize = 17;

/// Unique identifier for a user.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(transparent)]
#[sqlx(transparent)]
#[schema(value_type = String, example = "aB3dEfGh4JkLmN5pQ")]
pub struct UserId(String);

impl UserId {
    /// Creates a new random, collision-resistant ID.
    pub fn generate() -> Self {
        Self(id_gen::readable(USER_ID_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Macro to generate wrappers around database serial keys.
macro_rules! serial_id {
    ($name:ident, $inner:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            sqlx::Type,
            ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = i64)]
        pub struct $name($inner);

        impl $name {
            pub fn new(value: $inner) -> Self {
                Self(value)
            }

            pub fn get(&self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

serial_id!(RoleId, i32, "Unique identifier for a role.");
serial_id!(PermissionId, i32, "Unique identifier for a permission.");
serial_id!(PasswordId, i64, "Unique identifier for a stored password record.");
serial_id!(LoginId, i64, "Unique identifier for a user login record.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_user_ids_have_fixed_length_and_differ() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_eq!(a.as_str().len(), USER_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let user_id = UserId::from("abc");
        assert_eq!(serde_json::to_value(&user_id).unwrap(), "abc");
        let role_id = RoleId::new(7);
        assert_eq!(serde_json::to_value(role_id).unwrap(), 7);
        let parsed: RoleId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.get(), 42);
    }
}
