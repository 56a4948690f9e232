/// Refresh token generation
///
/// Refresh tokens are 32 bytes from the thread-local CSPRNG, hex encoded.
/// They carry no structure; the only way to check one is an exact lookup in
/// the session map.

use rand::{thread_rng, Rng};

pub const REFRESH_TOKEN_BYTES: usize = 32;

pub fn generate_refresh_token() -> String {
    let bytes: [u8; REFRESH_TOKEN_BYTES] = thread_rng().gen();
    hex::encode(bytes)
}
