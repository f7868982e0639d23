use anyhow::{Context, Result};
use std::sync::OnceLock;

/// bcrypt work factor, overridable through `BCRYPT_COST` (clamped to the
/// range bcrypt accepts).
fn cost() -> u32 {
    static COST: OnceLock<u32> = OnceLock::new();
    *COST.get_or_init(|| {
        std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(|c: u32| c.clamp(4, 31))
            .unwrap_or(bcrypt::DEFAULT_COST)
    })
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, cost()).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
