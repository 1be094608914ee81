//! Auth flow tests against a mock hosted auth server

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use helpers::*;
use StageLight::config::Settings;
use StageLight::services::{AuthEvent, AuthProvider, AuthService, GoTrueClient, MemorySessionStore};
use StageLight::validation::Credentials;
use StageLight::StageLightError;

fn auth_service(settings: &Settings) -> AuthService {
    let provider = Arc::new(GoTrueClient::new(&settings.backend).unwrap());
    AuthService::new(provider, Arc::new(MemorySessionStore::new()), &settings.auth)
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_admin_sign_in_creates_session() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success(ADMIN_EMAIL, "access-1").await;
    let auth = auth_service(&test_settings(&mock.uri()));
    let mut events = auth.subscribe();

    let signed_in = auth
        .sign_in(credentials("  Director@StageLight.org ", ADMIN_PASSWORD))
        .await
        .unwrap();

    assert!(signed_in.context.is_admin);
    assert_eq!(signed_in.context.email(), Some(ADMIN_EMAIL));
    assert_eq!(
        events.recv().await.unwrap(),
        AuthEvent::SignedIn { email: ADMIN_EMAIL.to_string() }
    );

    let context = auth.context(Some(&signed_in.token)).await.unwrap();
    assert!(context.is_authenticated());
    assert!(auth.require_admin(Some(&signed_in.token)).await.is_ok());
}

#[tokio::test]
async fn test_email_off_the_allow_list_never_reaches_provider() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success("stranger@example.com", "access-1").await;
    let auth = auth_service(&test_settings(&mock.uri()));

    let result = auth.sign_in(credentials("stranger@example.com", "whatever")).await;

    assert_matches!(result, Err(StageLightError::AccessDenied));
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_wrong_password_is_indistinguishable_from_unknown_email() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_rejected().await;
    let auth = auth_service(&test_settings(&mock.uri()));

    let wrong_password = auth.sign_in(credentials(ADMIN_EMAIL, "nope")).await.unwrap_err();
    let unknown_email = auth.sign_in(credentials("stranger@example.com", "nope")).await.unwrap_err();

    assert_matches!(wrong_password, StageLightError::AccessDenied);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(mock.request_count().await, 1);
}

#[tokio::test]
async fn test_provider_outage_is_a_backend_error() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_unavailable().await;
    let auth = auth_service(&test_settings(&mock.uri()));

    let result = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await;

    assert_matches!(result, Err(StageLightError::Backend(_)));
}

#[tokio::test]
async fn test_provider_identity_off_the_list_is_revoked() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success("someone.else@example.com", "access-1").await;
    mock.mock_logout().await;
    let auth = auth_service(&test_settings(&mock.uri()));

    let result = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await;

    assert_matches!(result, Err(StageLightError::AccessDenied));
    // Password grant, then logout of the mismatched session
    assert_eq!(mock.request_count().await, 2);
}

#[tokio::test]
async fn test_expiring_session_is_refreshed() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success(ADMIN_EMAIL, "access-1").await;
    mock.mock_refresh_success(ADMIN_EMAIL, "access-2").await;
    let mut settings = test_settings(&mock.uri());
    // Every token is "about to expire"
    settings.auth.refresh_margin_seconds = 2 * 3600;
    let auth = auth_service(&settings);

    let signed_in = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await.unwrap();
    let mut events = auth.subscribe();

    let context = auth.context(Some(&signed_in.token)).await.unwrap();

    assert!(context.is_admin);
    assert_eq!(
        events.recv().await.unwrap(),
        AuthEvent::TokenRefreshed { email: Some(ADMIN_EMAIL.to_string()) }
    );
}

#[tokio::test]
async fn test_rejected_refresh_expires_session() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success(ADMIN_EMAIL, "access-1").await;
    mock.mock_refresh_rejected().await;
    let mut settings = test_settings(&mock.uri());
    settings.auth.refresh_margin_seconds = 2 * 3600;
    let auth = auth_service(&settings);

    let signed_in = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await.unwrap();
    let mut events = auth.subscribe();

    let context = auth.context(Some(&signed_in.token)).await.unwrap();
    assert!(!context.is_authenticated());
    assert_matches!(events.recv().await.unwrap(), AuthEvent::Expired { .. });

    assert_matches!(
        auth.require_admin(Some(&signed_in.token)).await,
        Err(StageLightError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_refresh_server_error_keeps_session() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success(ADMIN_EMAIL, "access-1").await;
    mock.mock_refresh_unavailable().await;
    let mut settings = test_settings(&mock.uri());
    settings.auth.refresh_margin_seconds = 2 * 3600;
    let auth = auth_service(&settings);

    let signed_in = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await.unwrap();
    let mut events = auth.subscribe();

    let context = auth.context(Some(&signed_in.token)).await.unwrap();
    assert!(context.is_admin);
    assert!(auth.require_admin(Some(&signed_in.token)).await.is_ok());
    assert!(events.try_recv().is_err());
    // Password grant, then one refresh attempt per lookup
    assert_eq!(mock.request_count().await, 3);
}

#[tokio::test]
async fn test_sign_out_drops_session() {
    let mock = MockAuthServer::new().await;
    mock.mock_sign_in_success(ADMIN_EMAIL, "access-1").await;
    mock.mock_logout().await;
    let auth = auth_service(&test_settings(&mock.uri()));

    let signed_in = auth.sign_in(credentials(ADMIN_EMAIL, ADMIN_PASSWORD)).await.unwrap();
    auth.sign_out(&signed_in.token).await.unwrap();

    assert!(!auth.context(Some(&signed_in.token)).await.unwrap().is_authenticated());
    // Unknown tokens are ignored
    auth.sign_out(&signed_in.token).await.unwrap();
    assert_eq!(mock.request_count().await, 2);
}

#[tokio::test]
async fn test_client_fetches_user() {
    let mock = MockAuthServer::new().await;
    mock.mock_user(ADMIN_EMAIL).await;
    let client = GoTrueClient::new(&test_settings(&mock.uri()).backend).unwrap();

    let user = client.get_user("access-1").await.unwrap();

    assert_eq!(user.email.as_deref(), Some(ADMIN_EMAIL));
}
