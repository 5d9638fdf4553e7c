use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use velo_auth::auth::dto::SignUpRequest;
use velo_auth::auth::{AuthBackend, AuthError, AuthService, BackendError, HostedAuthBackend};
use velo_auth::user::{HostedProfileRepository, NewProfile, ProfileError, ProfileRepository};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HostedAuthBackend {
    HostedAuthBackend::new(server.uri(), "anon-key".to_string(), Duration::from_secs(2)).unwrap()
}

fn profiles(server: &MockServer) -> HostedProfileRepository {
    HostedProfileRepository::new(server.uri(), "anon-key".to_string(), Duration::from_secs(2))
        .unwrap()
}

#[tokio::test]
async fn sign_up_without_confirmation_returns_session() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({ "email": "rider@example.com", "password": "Aa1!aaaa" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": id, "email": "rider@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server).sign_up("rider@example.com", "Aa1!aaaa").await.unwrap();

    assert_eq!(result.account.id, id);
    let session = result.session.expect("session expected");
    assert_eq!(session.access_token, "jwt-token");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert!(session.expires_at.is_some());
}

#[tokio::test]
async fn sign_up_pending_confirmation_returns_bare_user() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": id, "email": "rider@example.com" })),
        )
        .mount(&server)
        .await;

    let result = backend(&server).sign_up("rider@example.com", "Aa1!aaaa").await.unwrap();

    assert_eq!(result.account.id, id);
    assert!(result.session.is_none());
}

#[tokio::test]
async fn sign_up_maps_existing_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "error_code": "user_already_exists",
            "msg": "User already registered"
        })))
        .mount(&server)
        .await;

    let error = backend(&server).sign_up("rider@example.com", "Aa1!aaaa").await.unwrap_err();
    assert_eq!(error, BackendError::EmailAlreadyRegistered);
}

#[tokio::test]
async fn sign_in_uses_password_grant() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "expires_in": 3600,
            "user": { "id": id, "email": "rider@example.com" }
        })))
        .mount(&server)
        .await;

    let session = backend(&server).sign_in("rider@example.com", "Aa1!aaaa").await.unwrap();
    assert_eq!(session.account.id, id);
    assert!(session.refresh_token.is_none());
}

#[tokio::test]
async fn sign_in_maps_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let error = backend(&server).sign_in("rider@example.com", "nope").await.unwrap_err();
    assert_eq!(error, BackendError::InvalidCredentials);
}

#[tokio::test]
async fn update_password_sends_bearer_token() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": id, "email": "rider@example.com" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_json(json!({ "password": "Zz9?zzzz" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let account = backend.current_account("jwt-token").await.unwrap();
    assert_eq!(account.email, "rider@example.com");

    let service = AuthService::new(Arc::new(backend), Arc::new(profiles(&server)));
    let request = serde_json::from_value(json!({
        "newPassword": "Zz9?zzzz",
        "confirmPassword": "Zz9?zzzz",
    }))
    .unwrap();
    service.change_password_with_token("jwt-token", &request).await.unwrap();
}

#[tokio::test]
async fn expired_session_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "msg": "invalid JWT: token is expired"
        })))
        .mount(&server)
        .await;

    let error = backend(&server).current_account("stale").await.unwrap_err();
    assert_eq!(error, BackendError::SessionExpired);
}

#[tokio::test]
async fn server_side_weak_password_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "error_code": "weak_password",
            "msg": "Password is known to be weak and easy to guess"
        })))
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    let request: SignUpRequest = serde_json::from_value(json!({
        "email": "rider@example.com",
        "password": "Aa1!aaaa",
        "confirmPassword": "Aa1!aaaa",
    }))
    .unwrap();

    match service.sign_up(&request).await {
        Err(AuthError::Backend(BackendError::WeakPassword(message))) => {
            assert!(message.contains("weak"))
        },
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("sign up should fail"),
    }
}

#[tokio::test]
async fn sign_up_inserts_profile_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "expires_in": 3600,
            "user": { "id": id, "email": "rider@example.com" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(header("prefer", "return=minimal"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    let request: SignUpRequest = serde_json::from_value(json!({
        "email": "rider@example.com",
        "password": "Aa1!aaaa",
        "confirmPassword": "Aa1!aaaa",
    }))
    .unwrap();

    let result = service.sign_up(&request).await.unwrap();
    assert_eq!(result.account.id, id);
}

#[tokio::test]
async fn profile_conflict_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let profile = NewProfile {
        id: Uuid::new_v4(),
        email: "rider@example.com".to_string(),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let error = profiles(&server).create_profile(&profile, None).await.unwrap_err();
    assert_eq!(error, ProfileError::AlreadyExists(profile.id));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let backend =
        HostedAuthBackend::new(uri, "anon-key".to_string(), Duration::from_millis(500)).unwrap();
    let error = backend.sign_in("rider@example.com", "Aa1!aaaa").await.unwrap_err();
    assert!(matches!(error, BackendError::Network(_)));
}

#[tokio::test]
async fn current_account_without_email_is_unexpected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": Uuid::new_v4() })))
        .mount(&server)
        .await;

    let error = backend(&server).current_account("jwt-token").await.unwrap_err();
    assert!(matches!(error, BackendError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn change_password_stops_when_account_has_no_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": Uuid::new_v4() })))
        .mount(&server)
        .await;

    // Neither re-authentication nor the update may be attempted
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    let request = serde_json::from_value(json!({
        "currentPassword": "Aa1!aaaa",
        "newPassword": "Zz9?zzzz",
        "confirmPassword": "Zz9?zzzz",
    }))
    .unwrap();

    match service.change_password_with_token("jwt-token", &request).await {
        Err(AuthError::Backend(BackendError::UnexpectedResponse(_))) => {},
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => panic!("password change should fail"),
    }
}

#[tokio::test]
async fn sign_out_posts_logout_with_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(query_param("scope", "local"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).sign_out("jwt-token").await.unwrap();
}

#[tokio::test]
async fn sign_out_with_stale_token_reports_expired_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "msg": "invalid JWT: token is expired"
        })))
        .mount(&server)
        .await;

    let error = backend(&server).sign_out("stale").await.unwrap_err();
    assert_eq!(error, BackendError::SessionExpired);
}

fn mount_password_grant(id: Uuid) -> Mock {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "expires_in": 3600,
            "user": { "id": id, "email": "rider@example.com" }
        })))
}

#[tokio::test]
async fn sign_in_recreates_missing_profile() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    mount_password_grant(id).mount(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    let session = service.sign_in("rider@example.com", "Aa1!aaaa").await.unwrap();
    assert_eq!(session.account.id, id);
}

#[tokio::test]
async fn sign_in_keeps_existing_profile() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    mount_password_grant(id).mount(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id,
            "email": "rider@example.com",
            "first_name": "Ana",
            "last_name": null,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    assert!(service.sign_in("rider@example.com", "Aa1!aaaa").await.is_ok());
}

#[tokio::test]
async fn sign_in_survives_profile_store_outage() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    mount_password_grant(id).mount(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = AuthService::new(Arc::new(backend(&server)), Arc::new(profiles(&server)));
    assert!(service.sign_in("rider@example.com", "Aa1!aaaa").await.is_ok());
}

#[tokio::test]
async fn get_profile_reads_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(query_param("select", "*"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id,
            "email": "rider@example.com",
            "phone_number": "0612345678"
        }])))
        .mount(&server)
        .await;

    let profile = profiles(&server).get_profile(id, None).await.unwrap().unwrap();
    assert_eq!(profile.id, id);
    assert_eq!(profile.phone_number.as_deref(), Some("0612345678"));
    assert!(profile.created_at.is_none());
}
