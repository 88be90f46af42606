//! E2E tests for the bearer-token guard on /api/v1/users.
//!
//! Header problems are 400 MALFORMED_REQUEST; token problems are
//! 401 UNAUTHORIZED with one fixed message.

use auth_test_utils::{
    TestAuthServer, TestTokenBuilder, ANN_EMAIL, ANN_NAME, ANN_PASSWORD, BOB_EMAIL, BOB_NAME,
    BOB_PASSWORD, OTHER_JWT_SECRET,
};
use jsonwebtoken::Algorithm;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

async fn assert_unauthorized(response: reqwest::Response) -> Result<(), anyhow::Error> {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(
        body["error"]["message"],
        "The access token is invalid or expired"
    );
    Ok(())
}

// ============================================================================
// Authorized access
// ============================================================================

/// A valid token lists every registered user, without password material.
#[tokio::test]
async fn test_list_users_with_valid_token_returns_all_users() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server
        .signup_and_signin(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
        .await?;
    server.signup(BOB_NAME, BOB_EMAIL, BOB_PASSWORD).await?;

    let response = server
        .get_with_auth("/api/v1/users", Some(&format!("Bearer {}", token)))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let users = body.as_array().expect("Response should be an array");
    assert_eq!(users.len(), 2);

    let emails: Vec<&str> = users.iter().filter_map(|u| u["email"].as_str()).collect();
    assert!(emails.contains(&ANN_EMAIL));
    assert!(emails.contains(&BOB_EMAIL));
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("password_hash").is_none());
    }

    Ok(())
}

/// /me returns the account the token was issued for.
#[tokio::test]
async fn test_me_returns_token_owner() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;
    let token = server
        .signup_and_signin(BOB_NAME, BOB_EMAIL, BOB_PASSWORD)
        .await?;

    let response = server
        .get_with_auth("/api/v1/users/me", Some(&format!("Bearer {}", token)))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["name"], BOB_NAME);
    assert_eq!(body["email"], BOB_EMAIL);

    Ok(())
}

/// The scheme name is matched case-insensitively and extra spacing is tolerated.
#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server
        .signup_and_signin(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
        .await?;

    for header in [
        format!("bearer {}", token),
        format!("BEARER {}", token),
        format!("Bearer   {}", token),
    ] {
        let response = server
            .get_with_auth("/api/v1/users/me", Some(&header))
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "header: {:?}", header);
    }

    Ok(())
}

// ============================================================================
// Malformed Authorization header
// ============================================================================

/// No Authorization header at all.
#[tokio::test]
async fn test_missing_header_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.get_with_auth("/api/v1/users", None).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "MALFORMED_REQUEST");

    Ok(())
}

/// Headers without a bearer scheme plus exactly one token.
#[tokio::test]
async fn test_malformed_headers_return_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for header in ["Bearer", "Basic dXNlcjpwYXNz", "Bearer a b", "token-only"] {
        let response = server
            .get_with_auth("/api/v1/users", Some(header))
            .await?;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "header {:?} should be rejected as malformed",
            header
        );
    }

    Ok(())
}

// ============================================================================
// Invalid tokens
// ============================================================================

/// A syntactically broken token.
#[tokio::test]
async fn test_garbage_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .get_with_auth("/api/v1/users", Some("Bearer not.a.jwt"))
        .await?;

    assert_unauthorized(response).await
}

/// A token whose signature does not match the server secret.
#[tokio::test]
async fn test_wrong_secret_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server
        .signup_and_signin(ANN_NAME, ANN_EMAIL, ANN_PASSWORD)
        .await?;
    let me: Value = server
        .get_with_auth("/api/v1/users/me", Some(&format!("Bearer {}", token)))
        .await?
        .json()
        .await?;
    let user_id: Uuid = me["id"].as_str().unwrap_or_default().parse()?;

    let forged = TestTokenBuilder::new()
        .for_user(user_id)
        .signed_with(OTHER_JWT_SECRET)
        .sign();

    let response = server
        .get_with_auth("/api/v1/users", Some(&format!("Bearer {}", forged)))
        .await?;

    assert_unauthorized(response).await
}

/// A token signed with the right secret but a different HMAC algorithm.
#[tokio::test]
async fn test_wrong_algorithm_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new()
        .with_algorithm(Algorithm::HS512)
        .sign();

    let response = server
        .get_with_auth("/api/v1/users", Some(&format!("Bearer {}", token)))
        .await?;

    assert_unauthorized(response).await
}

/// An expired token for a real account.
#[tokio::test]
async fn test_expired_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.signup(ANN_NAME, ANN_EMAIL, ANN_PASSWORD).await?;
    let signup_user = {
        use auth_service::repositories::users::UserStore;
        server.users().find_by_email(ANN_EMAIL).await?
    };

    let token = TestTokenBuilder::new()
        .for_user(signup_user.id)
        .issued_at(chrono::Utc::now().timestamp() - 7200)
        .expires_in(-60)
        .sign();

    let response = server
        .get_with_auth("/api/v1/users", Some(&format!("Bearer {}", token)))
        .await?;

    assert_unauthorized(response).await
}

/// A well-signed token whose subject is not a registered user.
#[tokio::test]
async fn test_token_for_unknown_user_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().for_user(Uuid::new_v4()).sign();

    let response = server
        .get_with_auth("/api/v1/users/me", Some(&format!("Bearer {}", token)))
        .await?;

    assert_unauthorized(response).await
}

/// A well-signed token whose subject is not a UUID.
#[tokio::test]
async fn test_token_with_non_uuid_subject_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().with_subject("ann@x.com").sign();

    let response = server
        .get_with_auth("/api/v1/users/me", Some(&format!("Bearer {}", token)))
        .await?;

    assert_unauthorized(response).await
}

/// Tokens over the size cap are refused before any parsing.
#[tokio::test]
async fn test_oversized_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = "a".repeat(auth_service::crypto::MAX_JWT_SIZE_BYTES + 1);

    let response = server
        .get_with_auth("/api/v1/users", Some(&format!("Bearer {}", token)))
        .await?;

    assert_unauthorized(response).await
}
