mod common;

use ::common::category::SharedItemCategory;
use ::common::identity::Identity;
use ::common::crypto::PublicKey;
use friends_relay::http_server::api::handshake::HandshakeRequest;
use friends_relay::http_server::api::keys::{KeyEntry, KeysRequest};
use friends_relay::http_server::api::logout::LogoutRequest;
use friends_relay::http_server::api::query::QueryRequest;
use friends_relay::http_server::api::session::{LoginRequest, LOGIN_CHALLENGE};
use friends_relay::http_server::api::update::UpdateRequest;
use friends_relay::http_server::api::user::{PublicKeyRequest, RegisterRequest};
use friends_relay::http_server::api::SharedItem;
use friends_relay::{ApiClient, ApiError};
use reqwest::StatusCode;

#[tokio::test]
async fn test_livez() {
    let (url, _) = common::spawn_relay().await;
    let response = reqwest::get(url.join("/_status/livez").unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = reqwest::get(url.join("/nope").unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_logout() {
    let (url, state) = common::spawn_relay().await;
    let (client, registered, secret) = common::register(&url, "alice-hash").await;
    assert_eq!(state.user_count(), 1);

    // duplicate alias
    let err = client
        .call(RegisterRequest {
            alias_hash: "alice-hash".into(),
            public_key: secret.public().to_base64().unwrap(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));

    // published key is readable by anyone
    let anonymous = ApiClient::new(&url).unwrap();
    let published = anonymous
        .call(PublicKeyRequest {
            uuid: registered.uuid,
        })
        .await
        .unwrap();
    assert_eq!(
        PublicKey::from_base64(&published.public_key).unwrap(),
        secret.public()
    );

    // fresh client logs in with the same alias
    let other = ApiClient::new(&url).unwrap();
    let login = other
        .call(LoginRequest {
            alias_hash: "alice-hash".into(),
            challenge: LOGIN_CHALLENGE.to_vec(),
        })
        .await
        .unwrap();
    assert_eq!(login.uuid, registered.uuid);
    other
        .call(QueryRequest {
            category: SharedItemCategory::Location,
        })
        .await
        .unwrap();

    other.call(LogoutRequest).await.unwrap();
    let err = other
        .call(QueryRequest {
            category: SharedItemCategory::Location,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    // logging out ends the first client's session too
    let err = client
        .call(QueryRequest {
            category: SharedItemCategory::Handshake,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(state.session_count(), 0);
}

#[tokio::test]
async fn test_rejections() {
    let (url, _) = common::spawn_relay().await;
    let client = ApiClient::new(&url).unwrap();

    let err = client
        .call(LoginRequest {
            alias_hash: "nobody".into(),
            challenge: LOGIN_CHALLENGE.to_vec(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let err = client
        .call(RegisterRequest {
            alias_hash: "x".into(),
            public_key: "not a key".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    let err = client
        .call(UpdateRequest {
            category: SharedItemCategory::Location,
            data: "abc".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus(StatusCode::UNAUTHORIZED, _)));

    let err = client
        .call(PublicKeyRequest {
            uuid: Identity::provisional(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_handshake_and_shared_data() {
    let (url, _) = common::spawn_relay().await;
    let (alice, alice_id, _) = common::register(&url, "alice").await;
    let (bob, bob_id, _) = common::register(&url, "bob").await;

    let err = alice
        .call(HandshakeRequest {
            friend_id: Identity::provisional(),
            encrypted_seed: "seed".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    alice
        .call(HandshakeRequest {
            friend_id: bob_id.uuid,
            encrypted_seed: "seed".into(),
        })
        .await
        .unwrap();

    let pending = bob
        .call(QueryRequest {
            category: SharedItemCategory::Handshake,
        })
        .await
        .unwrap();
    assert_eq!(
        pending.items,
        vec![SharedItem {
            from: alice_id.uuid,
            data: "seed".into(),
            key: None,
        }]
    );

    let err = alice
        .call(UpdateRequest {
            category: SharedItemCategory::Handshake,
            data: "x".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    alice
        .call(UpdateRequest {
            category: SharedItemCategory::Location,
            data: "ciphertext".into(),
        })
        .await
        .unwrap();
    let visible = bob
        .call(QueryRequest {
            category: SharedItemCategory::Location,
        })
        .await
        .unwrap();
    assert!(visible.items.is_empty());

    alice
        .call(KeysRequest {
            keys: vec![KeyEntry {
                to: bob_id.uuid,
                key: "wrapped".into(),
            }],
        })
        .await
        .unwrap();
    let visible = bob
        .call(QueryRequest {
            category: SharedItemCategory::Location,
        })
        .await
        .unwrap();
    assert_eq!(
        visible.items,
        vec![SharedItem {
            from: alice_id.uuid,
            data: "ciphertext".into(),
            key: Some("wrapped".into()),
        }]
    );
}

#[tokio::test]
async fn test_unknown_category_path() {
    let (url, _) = common::spawn_relay().await;
    let secret = ::common::crypto::SecretKey::generate().unwrap();

    // raw client so we can hit a path no request type builds
    let raw = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let response = raw
        .post(url.join("/user").unwrap())
        .json(&RegisterRequest {
            alias_hash: "carol".into(),
            public_key: secret.public().to_base64().unwrap(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = raw
        .get(url.join("/query/weather").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = raw
        .get(url.join("/query/location").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
