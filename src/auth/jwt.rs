/// Access-token issuance and validation.
///
/// Tokens are HS256-signed with a symmetric key from configuration. The
/// verifier enforces signature, expiry, issuer, and audience.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, Role};
use crate::configuration::JwtSettings;
use crate::error::AppError;

/// Issue an access token for an account.
///
/// Pure function of account, clock, and settings; no state is touched.
///
/// # Errors
/// Returns an internal error if encoding fails.
pub fn generate_access_token(
    user_id: i64,
    role: Role,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, role, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract its claims.
///
/// # Errors
/// Returns `InvalidToken` if the token is expired, tampered with, or was
/// issued for a different issuer or audience.
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        AppError::InvalidToken
    })
}
