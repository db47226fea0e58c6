use budget_auth::auth::validate_access_token;
use budget_auth::configuration::{get_configuration, DatabaseSettings, Settings};
use budget_auth::startup::run;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool, Row};
use std::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub settings: Settings,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(
        listener,
        connection_pool.clone(),
        configuration.jwt.clone(),
        configuration.password.clone(),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
        settings: configuration,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

fn register_body(email: &str) -> Value {
    json!({
        "name": "Alice",
        "surname": "Smith",
        "userName": "alice",
        "email": email,
        "password": "password123"
    })
}

async fn register(app: &TestApp, client: &reqwest::Client, email: &str) -> reqwest::Response {
    client
        .post(&format!("{}/api/Auth/Register", &app.address))
        .json(&register_body(email))
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn login(
    app: &TestApp,
    client: &reqwest::Client,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(&format!("{}/api/Auth/Login", &app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request.")
}

// --- Registration ---

#[tokio::test]
async fn register_returns_201_and_persists_the_account() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = register(&app, &client, "alice@example.com").await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["surname"], "Smith");
    assert_eq!(body["userName"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].is_i64());

    let row = sqlx::query("SELECT role, hashed_password FROM users WHERE email = $1")
        .bind("alice@example.com")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch created account");

    // Default role, derived (not plaintext) password
    assert_eq!(row.get::<String, _>("role"), "Owner");
    assert_ne!(row.get::<String, _>("hashed_password"), "password123");
}

#[tokio::test]
async fn register_returns_422_with_every_validation_error() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body = json!({
        "name": "",
        "surname": "",
        "userName": "alice",
        "email": "not-an-email",
        "password": "short"
    });

    let response = client
        .post(&format!("{}/api/Auth/Register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(422, response.status().as_u16());

    let errors: Vec<String> = response.json().await.expect("Failed to parse response");
    assert_eq!(
        errors,
        vec![
            "Invalid email format.",
            "User name is necessary.",
            "User surname is necessary.",
            "Password should be a minimum of 8 characters.",
        ]
    );
}

#[tokio::test]
async fn register_returns_422_for_a_taken_email() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let first = register(&app, &client, "alice@example.com").await;
    assert_eq!(201, first.status().as_u16());

    let second = register(&app, &client, "alice@example.com").await;
    assert_eq!(422, second.status().as_u16());

    let errors: Vec<String> = second.json().await.expect("Failed to parse response");
    assert_eq!(errors, vec!["User with the same email already exists."]);
}

// --- Login ---

#[tokio::test]
async fn login_returns_201_with_a_token_pair_matching_the_account() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = register(&app, &client, "alice@example.com")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let response = login(&app, &client, "alice@example.com", "password123").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["userName"], "alice");
    assert_eq!(body["role"], "Owner");
    assert!(body["refreshToken"].is_string());

    // Access-token claims match the account row
    let claims = validate_access_token(body["token"].as_str().unwrap(), &app.settings.jwt)
        .expect("Login must return a valid access token");
    assert_eq!(claims.sub, created["id"].as_i64().unwrap().to_string());
    assert_eq!(claims.role.to_string(), "Owner");
}

#[tokio::test]
async fn login_returns_404_for_a_wrong_password_and_persists_nothing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;

    let response = login(&app, &client, "alice@example.com", "password1234").await;
    assert_eq!(404, response.status().as_u16());

    let message: String = response.json().await.expect("Failed to parse response");
    assert_eq!(message, "Invalid email or password. Please try again.");

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM refresh_tokens")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count refresh tokens");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn login_returns_404_for_an_unknown_email() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = login(&app, &client, "nobody@example.com", "password123").await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn login_replaces_the_previous_refresh_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;

    let first: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let second: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    // One live row per account, holding the latest token
    let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM refresh_tokens")
        .fetch_all(&app.db_pool)
        .await
        .expect("Failed to fetch refresh tokens");
    assert_eq!(tokens, vec![second["refreshToken"].as_str().unwrap()]);

    // The replaced token no longer refreshes
    let response = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": first["refreshToken"] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(422, response.status().as_u16());
}

// --- Token refresh ---

#[tokio::test]
async fn refresh_returns_201_and_the_new_token_carries_the_same_claims() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;
    let session: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": session["refreshToken"] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    let new_claims = validate_access_token(body["accessToken"].as_str().unwrap(), &app.settings.jwt)
        .expect("Refresh must return a valid access token");
    let old_claims = validate_access_token(session["token"].as_str().unwrap(), &app.settings.jwt)
        .expect("Login must return a valid access token");

    assert_eq!(new_claims.sub, old_claims.sub);
    assert_eq!(new_claims.role, old_claims.role);

    // No rotation: the same refresh token keeps working
    let again = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": session["refreshToken"] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, again.status().as_u16());
}

#[tokio::test]
async fn refresh_returns_422_for_an_unknown_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": "definitely-not-in-the-store" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(422, response.status().as_u16());

    let message: String = response.json().await.expect("Failed to parse response");
    assert_eq!(message, "Invalid or expired refresh token.");
}

#[tokio::test]
async fn refresh_returns_422_once_the_stored_expiry_has_passed() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;
    let session: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    // Age the stored row past its expiry; the token value still matches
    sqlx::query("UPDATE refresh_tokens SET expiry_date = $1")
        .bind(Utc::now() - Duration::hours(1))
        .execute(&app.db_pool)
        .await
        .expect("Failed to age refresh token");

    let response = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": session["refreshToken"] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(422, response.status().as_u16());
}

// --- Logout ---

#[tokio::test]
async fn logout_deletes_the_refresh_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;
    let session: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(&format!("{}/api/Auth/Logout", &app.address))
        .bearer_auth(session["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM refresh_tokens")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count refresh tokens");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn logout_twice_in_a_row_succeeds_both_times() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    register(&app, &client, "alice@example.com").await;
    let session: Value = login(&app, &client, "alice@example.com", "password123")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let token = session["token"].as_str().unwrap();

    for _ in 0..2 {
        let response = client
            .post(&format!("{}/api/Auth/Logout", &app.address))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16());
    }
}

#[tokio::test]
async fn logout_rejects_missing_or_malformed_bearer_tokens() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let no_header = client
        .post(&format!("{}/api/Auth/Logout", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_header.status().as_u16());

    for header in ["Bearer", "Basic dXNlcjpwYXNz", "BearerToken", ""] {
        let response = client
            .post(&format!("{}/api/Auth/Logout", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(
            401,
            response.status().as_u16(),
            "Should reject malformed header: {}",
            header
        );
    }

    let invalid = client
        .post(&format!("{}/api/Auth/Logout", &app.address))
        .bearer_auth("invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, invalid.status().as_u16());
}

// --- End-to-end session lifecycle ---

#[tokio::test]
async fn session_lifecycle_scenario() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Register, then log in with the right password
    let created = register(&app, &client, "alice@example.com").await;
    assert_eq!(201, created.status().as_u16());

    let good = login(&app, &client, "alice@example.com", "password123").await;
    assert_eq!(201, good.status().as_u16());
    let session: Value = good.json().await.expect("Failed to parse response");

    // Wrong password is indistinguishable from an unknown account
    let bad = login(&app, &client, "alice@example.com", "password1234").await;
    assert_eq!(404, bad.status().as_u16());

    // Logout tears the session down
    let logout = client
        .post(&format!("{}/api/Auth/Logout", &app.address))
        .bearer_auth(session["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, logout.status().as_u16());

    // The orphaned refresh token is gone, not merely expired
    let refresh = client
        .post(&format!("{}/api/Auth/RefreshToken", &app.address))
        .json(&json!({ "refreshToken": session["refreshToken"] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(422, refresh.status().as_u16());
}
