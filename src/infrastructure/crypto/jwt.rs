//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::shared::DomainError;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens (HS256)
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    pub issuer: String,
    pub audience: String,
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(s: &SecurityConfig) -> Self {
        Self {
            secret: s.jwt_secret.clone(),
            expiration_hours: s.jwt_expiration_hours,
            issuer: s.jwt_issuer.clone(),
            audience: s.jwt_audience.clone(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub roles: Vec<Role>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

impl TokenClaims {
    pub fn new(user_id: i32, roles: &[Role], config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: i32,
    roles: &[Role],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, roles, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Maps verification failures to the messages shown to API clients.
pub fn token_error(err: &jsonwebtoken::errors::Error) -> DomainError {
    match err.kind() {
        ErrorKind::ExpiredSignature => DomainError::Unauthorized("The token has expired".into()),
        _ => DomainError::Unauthorized(format!("Invalid authentication token: {}", err)),
    }
}
