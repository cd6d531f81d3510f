/// One-time email tokens
///
/// Verification and password-reset links carry a random token. The plaintext
/// only leaves the server inside an email. The database keeps the SHA-256
/// hash and lookups go through [`hash_token`].
///
/// # Format
///
/// 64 random bytes, hex encoded (128 lowercase hex chars). Safe to embed in a
/// URL path or query string without escaping.
///
/// # Example
///
/// ```
/// use mynotebook_shared::auth::token::{generate_token, hash_token, TOKEN_LENGTH};
///
/// let issued = generate_token();
/// assert_eq!(issued.token.len(), TOKEN_LENGTH);
/// assert_eq!(hash_token(&issued.token), issued.hash);
/// ```

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 64;

/// Length of the hex-encoded token
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// A freshly generated token and the hash to persist
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plaintext token, mailed to the user
    pub token: String,

    /// SHA-256 hex digest, stored in the database
    pub hash: String,
}

/// Generates a new random token from the thread-local CSPRNG
pub fn generate_token() -> IssuedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let hash = hash_token(&token);

    IssuedToken { token, hash }
}

/// Hashes a token for storage or lookup (SHA-256, lowercase hex)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks that a token has the shape `generate_token` produces
///
/// Lets handlers reject malformed input without a database round trip.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
