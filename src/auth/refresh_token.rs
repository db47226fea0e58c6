/// Refresh-token lifecycle.
///
/// A refresh token is 256 bits from the OS CSPRNG, base64-encoded, stored
/// verbatim with an absolute expiry. Each account holds at most one row:
/// login deletes the previous row before inserting, refresh leaves the row
/// untouched (no rotation), logout deletes it.
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use crate::error::AppError;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Persist a refresh token for an account, replacing any existing one.
///
/// Delete and insert run as two plain statements in one request, not inside
/// a transaction or under a unique constraint: concurrent logins for the same
/// account can interleave here and the single-live-token policy is best
/// effort, last writer wins.
///
/// # Errors
/// Returns an error if either statement fails.
pub async fn save_refresh_token(
    pool: &PgPool,
    user_id: i64,
    token: &str,
    expiry_seconds: i64,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    let expiry_date = Utc::now() + Duration::seconds(expiry_seconds);
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, token, expiry_date)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(token)
    .bind(expiry_date)
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up the account behind a presented refresh token.
///
/// Returns the account id and role only while the token row exists and its
/// expiry is in the future. An expired row is left in place; it is cleared by
/// logout or overwritten by the next login, never here.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn find_account_by_refresh_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<(i64, String)>, AppError> {
    let account = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT u.id, u.role
        FROM refresh_tokens rt
        JOIN users u ON u.id = rt.user_id
        WHERE rt.token = $1 AND rt.expiry_date > $2
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Delete the refresh token for an account, if any. Idempotent; deleting an
/// absent row is not an error.
pub async fn remove_refresh_token(pool: &PgPool, user_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_decodes_to_32_random_bytes() {
        let token = generate_refresh_token();

        let decoded = BASE64.decode(&token).expect("token must be base64");
        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);
    }

    #[test]
    fn generated_tokens_are_distinct() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();

        assert_ne!(first, second);
    }
}
