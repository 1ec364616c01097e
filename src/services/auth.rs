use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use deadpool_postgres::Pool;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use crate::error::{AppError, Result};
use crate::models::user::AdminUser;
use crate::repositories::user as user_repo;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hashes a password using Argon2id, returning a PHC string.
///
/// Used to provision `admin_users` rows.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a PHC hash.
///
/// The parameters are read from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Checks an email/password pair against `admin_users`.
///
/// Unknown users, inactive users and wrong passwords all produce the same
/// `AppError::Authentication` message.
pub async fn authenticate_user(db: &Pool, email: &str, password: &str) -> Result<AdminUser> {
    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = user_repo::find_active_by_email(db, email.trim())
        .await?
        .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!("✅ User authenticated: {}", user.id);

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
