//! Session lifecycle: the login payload shapes the auth service actually
//! produces, token claims, role normalization and expiry.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use mercadito_core::UserId;
use mercadito_engine::session::{SessionContext, extract_identity, is_session_expired};
use mercadito_engine::snapshot::MemoryStore;
use mercadito_engine::{EngineEvent, EventBus};

/// Build an unsigned JWT carrying the given claims object.
fn token_with_claims(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

fn context() -> SessionContext<Arc<MemoryStore>> {
    SessionContext::new(Arc::new(MemoryStore::new()), EventBus::new())
}

// =============================================================================
// Login payload shapes
// =============================================================================

#[test]
fn test_flat_login_payload() {
    let session = context();
    let body = json!({
        "token": "abc.def.ghi",
        "id": 7,
        "correo": "ana@example.com",
        "roles": ["ADMIN", "USER"]
    });

    let identity = session.apply_login(&body, None);
    assert_eq!(identity.user_id, Some(UserId::new(7)));
    assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    assert!(identity.has_role("ADMIN"));
    assert!(session.is_logged_in());
    assert_eq!(session.token().unwrap().expose_secret(), "abc.def.ghi");
}

#[test]
fn test_identity_recovered_from_token_claims() {
    // Some builds return only a token; identity rides in the claims.
    let token = token_with_claims(&json!({
        "userId": 12,
        "email": "leo@example.com",
        "roles": "ADMIN,USER"
    }));
    let body = json!({ "jwtToken": token });

    let identity = extract_identity(&body, None);
    assert_eq!(identity.user_id, Some(UserId::new(12)));
    assert_eq!(identity.email.as_deref(), Some("leo@example.com"));
    assert_eq!(identity.roles, vec!["ADMIN", "USER"]);
}

#[test]
fn test_token_taken_from_authorization_header() {
    let session = context();
    let body = json!({ "correo": "x@example.com" });

    session.apply_login(&body, Some("Bearer header.token.here"));
    assert_eq!(session.token().unwrap().expose_secret(), "header.token.here");
}

#[test]
fn test_body_fields_outrank_claims() {
    let token = token_with_claims(&json!({ "userId": 99, "email": "old@example.com" }));
    let body = json!({ "token": token, "id": 7, "correo": "new@example.com" });

    let identity = extract_identity(&body, None);
    assert_eq!(identity.user_id, Some(UserId::new(7)));
    assert_eq!(identity.email.as_deref(), Some("new@example.com"));
}

#[test]
fn test_roles_as_json_array_string() {
    let body = json!({ "token": "t.t.t", "roles": "[\"ADMIN\",\"USER\"]" });
    let identity = extract_identity(&body, None);
    assert_eq!(identity.roles, vec!["ADMIN", "USER"]);
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn test_expired_token_is_reported() {
    let token = token_with_claims(&json!({ "exp": 1_000_000 }));
    assert!(is_session_expired(&token));
}

#[test]
fn test_claims_without_exp_fail_open() {
    let token = token_with_claims(&json!({ "userId": 1 }));
    assert!(!is_session_expired(&token));
}

#[test]
fn test_garbage_token_fails_open() {
    assert!(!is_session_expired("not-a-jwt"));
}

// =============================================================================
// Lifecycle and events
// =============================================================================

#[tokio::test]
async fn test_login_then_logout_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let events = EventBus::new();
    let session = SessionContext::new(Arc::clone(&store), events.clone());
    let mut rx = events.subscribe();

    session.apply_login(&json!({ "token": "t.t.t", "id": 3, "roles": ["USER"] }), None);
    assert_eq!(rx.try_recv().unwrap(), EngineEvent::AuthChanged);
    assert!(session.is_logged_in());

    session.clear();
    assert_eq!(rx.try_recv().unwrap(), EngineEvent::AuthChanged);
    assert!(!session.is_logged_in());
    assert!(session.identity().user_id.is_none());
    assert!(session.get_roles().is_empty());
}

#[test]
fn test_relogin_replaces_previous_identity() {
    let session = context();

    session.apply_login(
        &json!({ "token": "t.t.t", "id": 1, "correo": "a@x.com", "roles": ["ADMIN"] }),
        None,
    );
    // Second user's response carries no roles; the first user's must not
    // leak through.
    session.apply_login(&json!({ "token": "u.u.u", "id": 2 }), None);

    let identity = session.identity();
    assert_eq!(identity.user_id, Some(UserId::new(2)));
    assert!(identity.roles.is_empty());
    assert!(identity.email.is_none());
}

#[test]
fn test_page_size_preference() {
    let session = context();
    assert_eq!(session.page_size(), None);

    session.set_page_size(12);
    assert_eq!(session.page_size(), Some(12));

    session.set_page_size(0);
    assert_eq!(session.page_size(), Some(1));
}
