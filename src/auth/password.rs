/// Password derivation and verification.
///
/// PBKDF2-HMAC-SHA512 with a fixed iteration count, 32 bytes of output,
/// stored base64-encoded. The salt comes from configuration and is shared by
/// every account; per-account salts would be stronger but would fail to
/// verify any derivation already in the store, so the stored format is kept
/// as-is and the weakness is documented rather than fixed.
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;

use crate::configuration::PasswordSettings;

const DERIVED_KEY_BYTES: usize = 32;

/// Derive the storage form of a password.
pub fn derive_password_hash(password: &str, settings: &PasswordSettings) -> String {
    let mut derived = [0u8; DERIVED_KEY_BYTES];
    pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        settings.salt.as_bytes(),
        settings.iterations,
        &mut derived,
    );
    BASE64.encode(derived)
}

/// Check a presented password against a stored derivation.
///
/// Never fails for a mismatch; a missing salt or iteration count is a
/// startup-time configuration error, not a per-request one.
pub fn verify_password(password: &str, stored_hash: &str, settings: &PasswordSettings) -> bool {
    derive_password_hash(password, settings) == stored_hash
}
