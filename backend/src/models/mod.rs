pub mod password;
pub mod role;
pub mod session;
pub mod user;
pub mod user_login;

pub use password::Password;
pub use role::{Permission, Role};
pub use session::{CookieData, Session, SessionData};
pub use user::User;
pub use user_login::UserLogin;
