pub mod auth;
pub mod authz;
pub mod bootstrap;
pub mod session_store;
pub mod user;
