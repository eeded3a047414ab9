// Password hashing and verification (Argon2id, PHC string format)

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a stored digest.
/// A mismatch is `false`, never an error.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password digest is unreadable: {}", e);
            false
        }
    }
}

/// `hash_password` on the blocking pool; Argon2 is CPU-bound
pub async fn hash_password_off_thread(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

/// `verify_password` on the blocking pool
pub async fn verify_password_off_thread(password: String, digest: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &digest)).await {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}
