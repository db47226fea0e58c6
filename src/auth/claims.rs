/// Access-token claim set.
///
/// Carries the account identity and role plus the standard registered claims
/// (RFC 7519). Issuer and audience are checked on every validation.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::configuration::JwtSettings;
use crate::error::AppError;

/// Account role. A closed set rather than a free string, so a typo cannot
/// mint a third role. Serialized as `"Owner"` / `"Admin"` on the wire and in
/// the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "Owner"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Owner" => Ok(Role::Owner),
            "Admin" => Ok(Role::Admin),
            other => Err(AppError::Internal(format!("Unknown role: {}", other))),
        }
    }
}

/// Claims embedded in every access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account id, stringified)
    pub sub: String,
    /// Account role at issuance time
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Build the claim set for an account. Expiry is a fixed offset from the
    /// clock at issuance; already-issued tokens are never revoked early.
    pub fn new(user_id: i64, role: Role, config: &JwtSettings) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            role,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            exp: now + config.access_token_expiry,
            iat: now,
        }
    }

    /// Extract the account id from the subject claim.
    ///
    /// # Errors
    /// Returns `MissingIdentity` when the subject is absent or not an id,
    /// which the logout handler reports as a 400.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub.parse().map_err(|_| AppError::MissingIdentity)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
