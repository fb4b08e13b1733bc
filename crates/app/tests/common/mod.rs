//! Shared test utilities for client integration tests
#![allow(dead_code)]

use common::prelude::{Identity, IdentityCrypto, MemoryKeyVault};
use friends::services::{
    FriendService, HandshakeService, KeyUpdateService, LocationSharing, SessionManagement,
    SharedDataService,
};
use relay::{http_server, ApiClient, RelayState};
use tokio::net::TcpListener;
use url::Url;

/// Spawn a relay on an ephemeral local port and return its url
pub async fn spawn_relay() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        http_server::serve(
            listener,
            RelayState::new(),
            tracing::Level::DEBUG,
            std::future::pending(),
        )
        .await
        .unwrap();
    });

    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// One device: a relay client with its session plus local key material
pub struct TestUser {
    pub identity: Identity,
    pub client: ApiClient,
    pub crypto: IdentityCrypto<MemoryKeyVault>,
}

impl TestUser {
    /// Generate keys under a provisional identity, register, and migrate
    pub async fn register(remote: &Url, alias: &str) -> Self {
        let client = ApiClient::new(remote).unwrap();
        let crypto = IdentityCrypto::new(MemoryKeyVault::new());

        let provisional = Identity::provisional();
        let public_key = crypto.obtain_public_key(&provisional).unwrap();
        let identity = SessionManagement::new(client.clone())
            .register(alias, &public_key)
            .await
            .unwrap();
        crypto.migrate(&provisional, &identity).unwrap();

        Self {
            identity,
            client,
            crypto,
        }
    }

    pub fn session(&self) -> SessionManagement {
        SessionManagement::new(self.client.clone())
    }

    pub fn handshake(&self) -> HandshakeService {
        HandshakeService::new(self.client.clone())
    }

    pub fn keys(&self) -> KeyUpdateService {
        KeyUpdateService::new(self.client.clone())
    }

    pub fn shared_data(&self) -> SharedDataService {
        SharedDataService::new(self.client.clone())
    }

    pub fn friends(&self) -> FriendService<MemoryKeyVault> {
        FriendService::new(self.crypto.clone(), self.session(), self.keys())
    }

    pub fn locations(&self) -> LocationSharing<MemoryKeyVault> {
        LocationSharing::new(self.crypto.clone(), self.shared_data())
    }
}
