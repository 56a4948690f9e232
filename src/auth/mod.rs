/// Authentication module
///
/// Password hashing, access/refresh token issuing, and the refresh-token
/// session lifecycle.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use jwt::TokenIssuer;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use session::{login, logout, refresh};
pub use session::{LoginOutcome, RefreshOutcome, UserView};
