//! Salted password hashing with scrypt.
//!
//! Digests and salts are stored as standard base64. The KDF is fed the
//! salt's base64 text, not the decoded bytes, so stored rows can be
//! verified without a decode step.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use subtle::ConstantTimeEq;

use crate::error::{ServiceError, ServiceResult};

/// log2 of the scrypt cost factor.
pub const SCRYPT_LOG_N: u8 = 17;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;
pub const KEY_LEN: usize = 64;
pub const SALT_LEN: usize = 128;

pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    STANDARD.encode(salt)
}

fn params() -> ServiceResult<Params> {
    Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| ServiceError::Hashing(format!("invalid scrypt parameters: {}", e)))
}

/// Derives the raw digest. CPU and memory heavy; call from a blocking
/// context.
pub fn derive(password: &str, salt: &str) -> ServiceResult<Vec<u8>> {
    let params = params()?;
    let mut out = vec![0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut out)
        .map_err(|e| ServiceError::Hashing(format!("scrypt failed: {}", e)))?;
    Ok(out)
}

/// Returns the base64 digest for storage.
pub fn hash_password(password: &str, salt: &str) -> ServiceResult<String> {
    derive(password, salt).map(|digest| STANDARD.encode(digest))
}

pub fn verify_password(stored_hash: &str, salt: &str, candidate: &str) -> ServiceResult<bool> {
    let stored = match STANDARD.decode(stored_hash) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };
    let computed = derive(candidate, salt)?;
    if stored.len() != computed.len() {
        return Ok(false);
    }
    Ok(bool::from(stored.ct_eq(&computed)))
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_async(password: String, salt: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, &salt))
        .await
        .map_err(|e| ServiceError::Hashing(format!("hashing task failed: {}", e)))?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_async(
    stored_hash: String,
    salt: String,
    candidate: String,
) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &salt, &candidate))
        .await
        .map_err(|e| ServiceError::Hashing(format!("verification task failed: {}", e)))?
}
