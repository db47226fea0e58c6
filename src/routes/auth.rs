/// Authentication endpoints: registration, login, token refresh, logout.
///
/// Paths and payloads follow the portal's wire contract (camelCase JSON,
/// Created on success, fixed error strings).
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    derive_password_hash, find_account_by_refresh_token, generate_access_token,
    generate_refresh_token, remove_refresh_token, save_refresh_token, verify_password, Claims,
    Role,
};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::error::{AppError, DUPLICATE_EMAIL};
use crate::validators::validate_registration;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Token pair plus account summary returned by a successful login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginResponse {
    pub id: i64,
    pub user_name: String,
    pub role: Role,
    pub token: String,
    pub refresh_token: String,
}

/// Created-account summary returned by a successful registration
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub user_name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// POST /api/Auth/Register
///
/// Validate the submission, derive the password hash, insert the account with
/// the default `Owner` role.
///
/// # Errors
/// - 422: list of every validation failure, including a taken email
/// - 500: store failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    password_config: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let mut errors = validate_registration(&form.name, &form.surname, &form.email, &form.password);

    // Uniqueness joins the same error list as the shape checks
    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&form.email)
            .fetch_one(pool.get_ref())
            .await?;
    if email_taken {
        errors.push(DUPLICATE_EMAIL.to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let hashed_password = derive_password_hash(&form.password, password_config.get_ref());

    let (user_id,) = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO users (name, surname, user_name, email, role, hashed_password, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&form.name)
    .bind(&form.surname)
    .bind(&form.user_name)
    .bind(&form.email)
    .bind(Role::Owner.to_string())
    .bind(&hashed_password)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse {
        id: user_id,
        name: form.name.clone(),
        surname: form.surname.clone(),
        user_name: form.user_name.clone(),
        email: form.email.clone(),
    }))
}

/// POST /api/Auth/Login
///
/// Verify the password against the stored derivation; on success issue an
/// access token and a fresh refresh token, replacing any previously persisted
/// one for the account. On failure nothing is persisted.
///
/// # Errors
/// - 404: unknown email or wrong password (one shared message for both)
/// - 500: store or signing failure
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
    password_config: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let account = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, user_name, role, hashed_password FROM users WHERE email = $1",
    )
    .bind(&form.email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let (user_id, user_name, role, hashed_password) = account;

    if !verify_password(&form.password, &hashed_password, password_config.get_ref()) {
        return Err(AppError::InvalidCredentials);
    }

    let role: Role = role.parse()?;
    let token = generate_access_token(user_id, role, jwt_config.get_ref())?;
    let refresh_token = generate_refresh_token();

    save_refresh_token(
        pool.get_ref(),
        user_id,
        &refresh_token,
        jwt_config.refresh_token_expiry,
    )
    .await?;

    tracing::info!(user_id, "User logged in");

    Ok(HttpResponse::Created().json(UserLoginResponse {
        id: user_id,
        user_name,
        role,
        token,
        refresh_token,
    }))
}

/// POST /api/Auth/RefreshToken
///
/// Exchange an unexpired refresh token for a new access token. The refresh
/// token is not rotated; the same value keeps working until expiry, logout,
/// or the next login.
///
/// # Errors
/// - 422: token unknown or past its expiry
/// - 500: store or signing failure
pub async fn refresh_token(
    form: web::Json<RefreshTokenRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let (user_id, role) = find_account_by_refresh_token(pool.get_ref(), &form.refresh_token)
        .await?
        .ok_or(AppError::InvalidRefreshToken)?;

    let role: Role = role.parse()?;
    let access_token = generate_access_token(user_id, role, jwt_config.get_ref())?;

    tracing::info!(user_id, "Access token refreshed");

    Ok(HttpResponse::Created().json(AccessTokenResponse { access_token }))
}

/// POST /api/Auth/Logout
///
/// Delete the caller's persisted refresh token. Requires a valid bearer
/// access token; the identity comes from its claims, injected by the
/// middleware. Idempotent: logging out with no stored token still succeeds.
///
/// # Errors
/// - 400: identity claim missing or unparseable
/// - 500: store failure
pub async fn logout(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    remove_refresh_token(pool.get_ref(), user_id).await?;

    tracing::info!(user_id, "User logged out");

    Ok(HttpResponse::Ok().json("Logged out successfully."))
}
