use anyhow::Result;
use std::env;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        Self::new(
            secret,
            env::var("JWT_ACCESS_EXPIRATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            env::var("JWT_REFRESH_EXPIRATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_209_600),
        )
    }

    pub fn new(secret: String, access_token_expiry: u64, refresh_token_expiry: u64) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} characters"
            ));
        }

        Ok(Self {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}
