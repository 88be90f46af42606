//! E2E tests for account signup and signin.
//!
//! ## Test Categories
//!
//! - **Signup**: Account creation and input validation
//! - **Signin**: Credential checks and token issuance
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use auth_test_utils::{
    TestAuthServer, TokenAssertions, ANN_EMAIL, ANN_NAME, ANN_PASSWORD, BOB_EMAIL, BOB_NAME,
    BOB_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Signup Tests
// ============================================================================

/// A new account is created and returned without any password material.
#[tokio::test]
async fn test_signup_happy_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED, "Signup should succeed");

    let body: Value = response.json().await?;
    assert_eq!(body["name"], ANN_NAME);
    assert_eq!(body["email"], ANN_EMAIL);
    assert!(body["id"].is_string(), "Response should include the user id");
    assert!(
        body["created_at"].is_string(),
        "Response should include created_at"
    );
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    assert_eq!(server.users().len().await, 1);

    Ok(())
}

/// The stored password is a bcrypt hash, never the plaintext.
#[tokio::test]
async fn test_signup_stores_bcrypt_hash() -> Result<(), anyhow::Error> {
    use auth_service::repositories::users::UserStore;

    let server = TestAuthServer::spawn().await?;
    server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;

    let user = server.users().find_by_email(ANN_EMAIL).await?;
    assert_ne!(user.password_hash, ANN_PASSWORD);
    assert!(
        user.password_hash.starts_with("$2b$"),
        "Password should be stored as a bcrypt hash"
    );

    Ok(())
}

/// A second signup with the same email is rejected and nothing new is stored.
#[tokio::test]
async fn test_signup_duplicate_email_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let first = server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = server.signup("Another Ann", ANN_EMAIL, "different").await?;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(server.users().len().await, 1);

    Ok(())
}

/// Concurrent signups for one email produce exactly one account.
#[tokio::test]
async fn test_signup_concurrent_duplicates_create_one_account() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let (a, b) = tokio::join!(
        server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD),
        server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
    );

    let mut statuses = vec![a?.status(), b?.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(server.users().len().await, 1);

    Ok(())
}

/// Empty or malformed fields are rejected before anything is stored.
#[tokio::test]
async fn test_signup_invalid_fields_return_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let cases = [
        ("", ANN_EMAIL, ANN_PASSWORD),
        (ANN_NAME, "", ANN_PASSWORD),
        (ANN_NAME, "not-an-email", ANN_PASSWORD),
        (ANN_NAME, ANN_EMAIL, ""),
    ];

    for (name, email, password) in cases {
        let response = server.signup(name, email, password).await?;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Signup with name={:?} email={:?} should be rejected",
            name,
            email
        );
        let body: Value = response.json().await?;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    assert!(server.users().is_empty().await);

    Ok(())
}

/// A body missing required fields never reaches the service.
#[tokio::test]
async fn test_signup_missing_fields_is_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/signup", server.url()))
        .json(&json!({ "email": ANN_EMAIL }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(
        body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("name")),
        "Message should name the missing field, got: {}",
        body
    );
    assert!(server.users().is_empty().await);

    Ok(())
}

/// A body that is not JSON at all gets the same error envelope.
#[tokio::test]
async fn test_signup_unparseable_body_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/signup", server.url()))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

// ============================================================================
// Signin Tests
// ============================================================================

/// Correct credentials return the account profile and a usable token.
#[tokio::test]
async fn test_signin_happy_path() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let signup: Value = server
        .signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
        .await?
        .json()
        .await?;
    let user_id = signup["id"].as_str().unwrap_or_default().to_string();

    let response = server.signin(ANN_EMAIL, ANN_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["name"], ANN_NAME);
    assert_eq!(body["email"], ANN_EMAIL);

    let token = body["jwtToken"]
        .as_str()
        .expect("Response should include jwtToken")
        .to_string();
    token
        .assert_valid_jwt()
        .assert_for_subject(&user_id)
        .assert_expires_in(server.config().jwt_expiration_seconds);

    Ok(())
}

/// Wrong password and unknown email are indistinguishable to the caller.
#[tokio::test]
async fn test_signin_failures_are_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;

    let wrong_password = server.signin(ANN_EMAIL, "not-the-password").await?;
    let unknown_email = server.signin("nobody@x.com", ANN_PASSWORD).await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password_body: Value = wrong_password.json().await?;
    let unknown_email_body: Value = unknown_email.json().await?;
    assert_eq!(wrong_password_body, unknown_email_body);
    assert_eq!(wrong_password_body["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

/// A signin body missing the password is a validation error, not a 422.
#[tokio::test]
async fn test_signin_missing_fields_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/signin", server.url()))
        .json(&json!({ "email": ANN_EMAIL }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

/// Each account signs in only with its own password.
#[tokio::test]
async fn test_signin_does_not_cross_accounts() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;
    server.signup(BOB_NAME, BOB_EMAIL, BOB_PASSWORD).await?;

    let crossed = server.signin(ANN_EMAIL, BOB_PASSWORD).await?;
    assert_eq!(crossed.status(), StatusCode::UNAUTHORIZED);

    let bob = server.signin(BOB_EMAIL, BOB_PASSWORD).await?;
    assert_eq!(bob.status(), StatusCode::OK);
    let body: Value = bob.json().await?;
    assert_eq!(body["name"], BOB_NAME);

    Ok(())
}

/// Signing in twice yields two tokens that both work.
#[tokio::test]
async fn test_signin_repeated_tokens_all_valid() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let first = server
        .signup_and_signin(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
        .await?;
    let second: Value = server
        .signin(ANN_EMAIL, ANN_PASSWORD)
        .await?
        .json()
        .await?;
    let second = second["jwtToken"].as_str().unwrap_or_default().to_string();

    for token in [first, second] {
        let response = server
            .get_with_auth("/api/v1/users/me", Some(&format!("Bearer {}", token)))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    Ok(())
}
