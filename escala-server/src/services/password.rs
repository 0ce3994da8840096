//! Password hashing (argon2id, PHC string format)

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;

use crate::error::{AppError, AppResult};

/// Hash a password on the blocking pool so the runtime threads stay free.
///
/// Uses `Argon2::default()`: argon2id v19, m = 19 MiB, t = 2, p = 1, with a
/// random 16-byte salt.
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| AppError::unexpected(format!("password hashing task failed: {e}")))?
    .map_err(|e| AppError::unexpected(format!("password hashing failed: {e}")))
}
