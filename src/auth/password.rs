use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

// Argon2id cost, pinned so stored hashes do not drift with crate upgrades.
const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| anyhow::anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Returns the PHC string for `plain`, salted from the OS RNG.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    match hasher()?.hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(anyhow::anyhow!("hash password: {e}"))
        }
    }
}

/// `Ok(false)` on a mismatch; `Err` only when `stored` is not a PHC string.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "stored password hash is malformed");
            return Err(anyhow::anyhow!("parse password hash: {e}"));
        }
    };
    Ok(hasher()?.verify_password(plain.as_bytes(), &parsed).is_ok())
}
