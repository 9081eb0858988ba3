//! Authentication and authorization integration tests.
//!
//! Every case here exercises a rejection path that never reaches the
//! database, so the server runs against a lazily-connecting pool and no
//! PostgreSQL instance is required.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use support::TestServer;

/// Assert the fixed error envelope: `{success:false, error:<status>,
/// message:<static>}`.
async fn assert_envelope(response: reqwest::Response, status: u16, message: &str) -> Result<()> {
    assert_eq!(response.status().as_u16(), status);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], status);
    assert_eq!(body["message"], message);

    Ok(())
}

#[tokio::test]
async fn test_missing_authorization_header_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    // Check WWW-Authenticate header
    let www_auth = response.headers().get("www-authenticate");
    assert!(www_auth.is_some(), "Should include WWW-Authenticate header");

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_wrong_scheme_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", "Basic abc123")
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_single_part_header_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", "Bearer")
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_three_part_header_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_with_permissions(&["get:drinks-detail"]);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {} extra", token))
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_scheme_is_case_insensitive() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    // Token lacks the needed permission, so reaching the 403 permission
    // check proves the lowercase scheme got through the auth gate
    let token = server.token_with_permissions(&["post:drinks"]);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 403, "insufficient permission").await
}

#[tokio::test]
async fn test_token_without_required_permission_is_403() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_with_permissions(&["get:drinks-detail"]);
    let response = client
        .delete(format!("{}/drinks/1", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 403, "insufficient permission").await
}

#[tokio::test]
async fn test_each_route_requires_its_own_permission() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    // A delete permission opens none of the other routes
    let token = server.token_with_permissions(&["delete:drinks"]);

    let detail = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(detail.status(), 403);

    let create = client
        .post(format!("{}/drinks", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"title": "X", "recipe": []}))
        .send()
        .await?;
    assert_eq!(create.status(), 403);

    let update = client
        .patch(format!("{}/drinks/1", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"title": "X"}))
        .send()
        .await?;
    assert_eq!(update.status(), 403);

    Ok(())
}

#[tokio::test]
async fn test_token_without_permissions_claim_is_400() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_without_permissions_claim();
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 400, "bad request").await
}

#[tokio::test]
async fn test_expired_token_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.expired_token(&["get:drinks-detail"]);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_wrong_audience_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_with_audience("some-other-api", &["get:drinks-detail"]);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_wrong_issuer_is_401() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_with_issuer("https://evil.example.com/", &["get:drinks-detail"]);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 401, "unauthorized").await
}

#[tokio::test]
async fn test_unknown_kid_is_400() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    // Token signed before the key set rotated away from its kid
    let token = server.token_with_permissions(&["get:drinks-detail"]);
    server.rotate_to_unknown_key().await;

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 400, "bad request").await
}

#[tokio::test]
async fn test_malformed_token_is_400() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await?;

    assert_envelope(response, 400, "bad request").await
}

#[tokio::test]
async fn test_oversized_token_is_400() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let oversized_token = "a".repeat(9000);
    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", oversized_token))
        .send()
        .await?;

    assert_envelope(response, 400, "bad request").await
}

#[tokio::test]
async fn test_token_with_alg_none_is_rejected() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    // Algorithm confusion attack: unsigned token with a known kid
    let now = chrono::Utc::now().timestamp();
    let header = format!(r#"{{"alg":"none","typ":"JWT","kid":"{}"}}"#, support::TEST_KID);
    let claims = format!(
        r#"{{"sub":"attacker","iss":"{}","aud":"{}","exp":{},"iat":{},"permissions":["get:drinks-detail"]}}"#,
        support::TEST_ISSUER,
        support::TEST_AUDIENCE,
        now + 3600,
        now
    );

    let malicious_token = format!(
        "{}..{}",
        URL_SAFE_NO_PAD.encode(header.as_bytes()),
        URL_SAFE_NO_PAD.encode(claims.as_bytes())
    );

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", malicious_token))
        .send()
        .await?;

    assert_eq!(
        response.status(),
        400,
        "Token with alg:none should be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn test_token_with_alg_hs256_is_rejected() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    // Attacker tries to downgrade to HMAC using the public key as secret
    let now = chrono::Utc::now().timestamp();
    let header = format!(r#"{{"alg":"HS256","typ":"JWT","kid":"{}"}}"#, support::TEST_KID);
    let claims = format!(
        r#"{{"sub":"attacker","iss":"{}","aud":"{}","exp":{},"iat":{},"permissions":["get:drinks-detail"]}}"#,
        support::TEST_ISSUER,
        support::TEST_AUDIENCE,
        now + 3600,
        now
    );

    let fake_signature = URL_SAFE_NO_PAD.encode(b"fake_hmac_signature_attempt");
    let malicious_token = format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.as_bytes()),
        URL_SAFE_NO_PAD.encode(claims.as_bytes()),
        fake_signature
    );

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", malicious_token))
        .send()
        .await?;

    assert_eq!(
        response.status(),
        400,
        "Token with alg:HS256 should be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn test_jwks_endpoint_failure_is_503() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let token = server.token_with_permissions(&["get:drinks-detail"]);
    server.break_jwks_endpoint().await;

    let response = client
        .get(format!("{}/drinks-detail", server.url()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_envelope(response, 503, "service unavailable").await
}

#[tokio::test]
async fn test_health_endpoint_is_public() -> Result<()> {
    let server = TestServer::spawn_without_database().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    // No database behind this server, so the probe reports unhealthy but
    // still answers
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "unhealthy");

    Ok(())
}
