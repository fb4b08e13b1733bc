//! Shared test utilities for relay api tests
#![allow(dead_code)]

use std::net::SocketAddr;

use common::crypto::SecretKey;
use friends_relay::http_server;
use friends_relay::http_server::api::user::{RegisterRequest, RegisterResponse};
use friends_relay::{ApiClient, RelayState};
use tokio::net::TcpListener;
use url::Url;

/// Spawn a relay on an ephemeral local port and return its url
pub async fn spawn_relay() -> (Url, RelayState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let state = RelayState::new();

    let server_state = state.clone();
    tokio::spawn(async move {
        http_server::serve(
            listener,
            server_state,
            tracing::Level::DEBUG,
            std::future::pending(),
        )
        .await
        .unwrap();
    });

    let url = Url::parse(&format!("http://{}", addr)).unwrap();
    (url, state)
}

/// Register a fresh user and return a client carrying its session
pub async fn register(remote: &Url, alias_hash: &str) -> (ApiClient, RegisterResponse, SecretKey) {
    let client = ApiClient::new(remote).unwrap();
    let secret = SecretKey::generate().unwrap();
    let response = client
        .call(RegisterRequest {
            alias_hash: alias_hash.to_string(),
            public_key: secret.public().to_base64().unwrap(),
        })
        .await
        .unwrap();
    (client, response, secret)
}
