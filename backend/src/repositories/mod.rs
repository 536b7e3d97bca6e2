pub mod password;
pub mod rbac;
pub mod session;
pub mod transaction;
pub mod user;
pub mod user_login;

pub use transaction::*;
