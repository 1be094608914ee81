//! Mock hosted auth server
//!
//! Serves the handful of auth REST endpoints the client talks to.

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct MockAuthServer {
    pub server: MockServer,
}

impl MockAuthServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn token_body(email: &str, access_token: &str, expires_in: i64) -> serde_json::Value {
        json!({
            "access_token": access_token,
            "refresh_token": format!("refresh-{}", access_token),
            "token_type": "bearer",
            "expires_in": expires_in,
            "expires_at": Utc::now().timestamp() + expires_in,
            "user": {
                "id": "a7d1c6f0-0000-4000-8000-000000000001",
                "email": email,
                "role": "authenticated"
            }
        })
    }

    /// Accept a password grant for `email`
    pub async fn mock_sign_in_success(&self, email: &str, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "test-anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::token_body(email, access_token, 3600)))
            .mount(&self.server)
            .await;
    }

    /// Reject every password grant the way the provider does for bad credentials
    pub async fn mock_sign_in_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in_unavailable(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_refresh_success(&self, email: &str, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::token_body(email, access_token, 3600)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_refresh_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Refresh Token Not Found"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_refresh_unavailable(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_user(&self, email: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a7d1c6f0-0000-4000-8000-000000000001",
                "email": email
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_logout(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server has seen so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
