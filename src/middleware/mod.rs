/// Middleware module
///
/// Request extractors for credentials, and the static-file hit counter.

mod credentials;
mod hit_counter;

pub use credentials::{extract_credential, AuthScheme, AuthenticatedUser, BearerToken, PolkaApiKey};
pub use hit_counter::HitCounterMiddleware;
