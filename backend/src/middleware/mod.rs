pub mod auth;
pub mod logging;
pub mod request_id;
pub mod session;

pub use auth::{auth, CurrentUser};
pub use logging::log_error_responses;
pub use request_id::{request_id, RequestId};
pub use session::{session, SessionHandle};
