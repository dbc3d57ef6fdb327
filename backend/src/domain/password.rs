//! Password hashing with Argon2.
//!
//! Hashes use the crate's default Argon2id parameters and are stored in PHC
//! string format, so the salt and cost travel with the hash.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use zeroize::Zeroizing;

use super::Error;

/// Plaintext password that is wiped from memory when dropped.
pub type Password = Zeroizing<String>;

/// Hash `password` into a PHC string.
///
/// # Errors
/// Returns an internal error if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Check `password` against a stored PHC hash.
///
/// Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
