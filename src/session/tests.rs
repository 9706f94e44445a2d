use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::*;
use crate::api::testing::{jwt_with_exp, respond, user_json, ScriptedTransport};
use crate::api::{Method, REFRESH_PATH};
use crate::models::ProfileFieldsUpdate;
use crate::storage::MemoryStore;

const BASE: &str = "http://backend.test/api";

fn context(transport: Arc<ScriptedTransport>, tokens: Option<TokenPair>) -> (SessionContext, ApiClient) {
    let store = TokenStore::new(Arc::new(MemoryStore::new()));
    if let Some(pair) = tokens {
        store.set(&pair).unwrap();
    }
    let client = ApiClient::new(BASE, transport, store);
    (SessionContext::for_client(&client), client)
}

fn valid_token() -> String {
    jwt_with_exp(Utc::now().timestamp() + 3600)
}

#[tokio::test]
async fn test_login_stores_tokens_and_session() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| {
        let mut user = user_json(1, "alice");
        user["first_name"] = json!("Alice");
        respond(200, json!({"user": user, "access": "A1", "refresh": "R1"}))
    }));
    let (mut session, client) = context(transport, None);

    let current = session.login("alice", "pw").await.unwrap();
    assert_eq!(current.user_id, 1);
    assert_eq!(current.username, "alice");
    assert_eq!(current.display_name, "Alice");

    assert_eq!(client.tokens().get().unwrap(), Some(TokenPair::new("A1", "R1")));
    assert!(session.state().is_authenticated());
}

#[tokio::test]
async fn test_failed_login_leaves_state_unchanged() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| {
        respond(401, json!({"error": "Invalid credentials"}))
    }));
    let (mut session, client) = context(transport.clone(), None);
    session.initialize().await.unwrap();

    let err = session.login("alice", "wrong").await.unwrap_err();
    match err {
        SessionError::Api(api) => assert_eq!(api.user_message("Failed to login"), "Invalid credentials"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(client.tokens().get().unwrap(), None);
    assert_eq!(transport.count(Method::Post, REFRESH_PATH), 0);
}

#[tokio::test]
async fn test_initialize_without_token_makes_no_call() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| respond(500, json!({}))));
    let (mut session, _client) = context(transport.clone(), None);

    assert_eq!(session.state(), &SessionState::Uninitialized);
    assert_eq!(session.initialize().await.unwrap(), &SessionState::Anonymous);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_expired_token_resolves_anonymous_without_profile_fetch() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| respond(200, user_json(1, "alice"))));
    let expired = jwt_with_exp(Utc::now().timestamp() - 10);
    let (mut session, client) = context(transport.clone(), Some(TokenPair::new(expired, "R1")));

    assert_eq!(session.initialize().await.unwrap(), &SessionState::Anonymous);
    assert_eq!(transport.count(Method::Get, "/users/profile/"), 0);
    assert_eq!(client.tokens().get().unwrap(), None);
}

#[tokio::test]
async fn test_valid_token_restores_session_from_profile() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| respond(200, user_json(3, "carol"))));
    let (mut session, _client) = context(transport.clone(), Some(TokenPair::new(valid_token(), "R1")));

    let state = session.initialize().await.unwrap();
    assert_eq!(state.session().map(|s| s.username.as_str()), Some("carol"));
    assert_eq!(transport.count(Method::Get, "/users/profile/"), 1);
}

#[tokio::test]
async fn test_profile_failure_clears_tokens() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| {
        respond(500, json!({"detail": "boom"}))
    }));
    let (mut session, client) = context(transport, Some(TokenPair::new(valid_token(), "R1")));

    assert_eq!(session.initialize().await.unwrap(), &SessionState::Anonymous);
    assert_eq!(client.tokens().get().unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_token_store() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| respond(200, user_json(1, "alice"))));
    let (mut session, client) = context(transport.clone(), Some(TokenPair::new(valid_token(), "R1")));
    session.initialize().await.unwrap();
    let calls = transport.requests().len();

    session.logout().unwrap();

    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(client.tokens().get().unwrap(), None);
    assert_eq!(client.tokens().access_token().unwrap(), None);
    assert_eq!(client.tokens().refresh_token().unwrap(), None);
    assert_eq!(transport.requests().len(), calls);
}

#[tokio::test]
async fn test_failed_refresh_expires_session() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |req| match req.path.as_str() {
        "/users/profile/" if req.method == Method::Get => respond(200, user_json(1, "alice")),
        REFRESH_PATH => respond(401, json!({"detail": "Token is blacklisted"})),
        _ => respond(401, json!({"detail": "Token expired"})),
    }));
    let (mut session, client) = context(transport, Some(TokenPair::new(valid_token(), "R1")));
    session.initialize().await.unwrap();
    assert!(session.state().is_authenticated());

    let _ = client.get::<serde_json::Value>("/progress/").await;

    assert_eq!(session.state(), &SessionState::Anonymous);
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |_| respond(200, user_json(1, "alice"))));
    let (mut session, _client) = context(transport.clone(), None);

    let err = session.update_profile(&ProfileUpdate::default()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotAuthenticated));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_update_profile_replaces_user() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |req| {
        let mut user = user_json(1, "alice");
        if req.method == Method::Put {
            user["last_name"] = json!("Liddell");
            user["profile"]["bio"] = json!("curious");
        }
        respond(200, user)
    }));
    let (mut session, _client) = context(transport, Some(TokenPair::new(valid_token(), "R1")));
    session.initialize().await.unwrap();

    let update = ProfileUpdate {
        last_name: Some("Liddell".into()),
        profile: Some(ProfileFieldsUpdate {
            bio: Some("curious".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let updated = session.update_profile(&update).await.unwrap();
    assert_eq!(updated.display_name, "Liddell");
    assert_eq!(updated.profile.as_ref().map(|p| p.bio.as_str()), Some("curious"));
}

#[tokio::test]
async fn test_failed_update_keeps_session() {
    let transport = Arc::new(ScriptedTransport::new(BASE, |req| {
        if req.method == Method::Put {
            respond(400, json!({"website_url": ["Enter a valid URL."]}))
        } else {
            respond(200, user_json(1, "alice"))
        }
    }));
    let (mut session, _client) = context(transport, Some(TokenPair::new(valid_token(), "R1")));
    session.initialize().await.unwrap();

    let update = ProfileUpdate {
        profile: Some(ProfileFieldsUpdate {
            website_url: Some("nope".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(session.update_profile(&update).await.is_err());
    assert_eq!(session.current_user().map(|s| s.username.as_str()), Some("alice"));
}
