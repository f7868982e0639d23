use crate::config::jwt::JwtConfig;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static JWT_CONFIG: OnceLock<JwtConfig> = OnceLock::new();

/// Install the JWT config. Must be called once at startup.
pub fn init_jwt_config(config: JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))?;
    Ok(())
}

fn get_config() -> Result<&'static JwtConfig> {
    JWT_CONFIG
        .get()
        .ok_or_else(|| anyhow::anyhow!("JWT config not initialized"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub token_type: TokenKind,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

fn encode_token(user_id: i32, kind: TokenKind) -> Result<String> {
    let config = get_config()?;
    let lifetime = match kind {
        TokenKind::Access => config.access_token_expiry,
        TokenKind::Refresh => config.refresh_token_expiry,
    };
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + lifetime as usize,
        iat: now,
        token_type: kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode {:?} token: {}", kind, e))
}

pub fn encode_access_token(user_id: i32) -> Result<String> {
    encode_token(user_id, TokenKind::Access)
}

pub fn encode_refresh_token(user_id: i32) -> Result<String> {
    encode_token(user_id, TokenKind::Refresh)
}

pub fn decode_jwt(token: &str) -> Result<Claims> {
    let config = get_config()?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow::anyhow!("Failed to decode JWT: {}", e))
}

/// Decode `token` and return its user id if it is a valid token of `kind`.
pub fn user_id_from_token(token: &str, kind: TokenKind) -> Option<i32> {
    let claims = decode_jwt(token).ok()?;
    if claims.token_type != kind {
        return None;
    }
    claims.user_id()
}

pub fn access_token_expiry_seconds() -> u64 {
    get_config().map(|c| c.access_token_expiry).unwrap_or(0)
}

pub fn refresh_token_expiry_seconds() -> u64 {
    get_config().map(|c| c.refresh_token_expiry).unwrap_or(0)
}
