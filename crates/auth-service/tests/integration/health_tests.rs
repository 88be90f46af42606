//! Integration tests for the liveness probe and metrics endpoint.

use auth_test_utils::{TestAuthServer, ANN_EMAIL, ANN_PASSWORD};
use reqwest::StatusCode;

/// /health returns 200 OK with a plain-text body
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );

    let body = response.text().await?;
    assert_eq!(body, "OK", "Health check body should be 'OK'");

    Ok(())
}

/// /health needs no Authorization header even though /api/v1/users does
#[tokio::test]
async fn test_health_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let health = server.get_with_auth("/health", None).await?;
    let users = server.get_with_auth("/api/v1/users", None).await?;

    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(users.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// /metrics serves Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    // Generate at least one signin metric
    let _ = server.signin(ANN_EMAIL, ANN_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    // Only one recorder can be installed per process; when another test won
    // that race this server renders an independent, possibly empty, handle.
    let body = response.text().await?;
    assert!(
        body.is_empty() || body.contains("auth_"),
        "Metrics should either be empty or use the auth_ prefix, got: {}",
        body
    );

    Ok(())
}
