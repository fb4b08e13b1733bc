mod common;

use ::common::prelude::{Identity, IdentityCrypto, MemoryKeyVault};
use common::TestUser;
use friends::services::{Registration, RegistrationError, SessionManagement};
use relay::ApiClient;
use url::Url;

fn registration(remote: &Url) -> (Registration<MemoryKeyVault>, IdentityCrypto<MemoryKeyVault>) {
    let crypto = IdentityCrypto::new(MemoryKeyVault::new());
    let session = SessionManagement::new(ApiClient::new(remote).unwrap());
    (Registration::new(crypto.clone(), session), crypto)
}

#[tokio::test]
async fn test_register_moves_keys_to_assigned_identity() {
    let remote = common::spawn_relay().await;
    let (registration, crypto) = registration(&remote);
    let provisional = Identity::provisional();
    let public_key = crypto.obtain_public_key(&provisional).unwrap();

    let identity = registration.register(&provisional, "alice").await.unwrap();
    assert_ne!(identity, provisional);
    assert_eq!(crypto.public_key(&identity).unwrap(), Some(public_key));
    assert!(crypto.public_key(&provisional).unwrap().is_none());
}

#[tokio::test]
async fn test_register_resumes_before_migration() {
    let remote = common::spawn_relay().await;
    let (registration, crypto) = registration(&remote);
    let provisional = Identity::provisional();
    let public_key = crypto.obtain_public_key(&provisional).unwrap();

    // an earlier run reached the relay and stopped
    let identity = SessionManagement::new(ApiClient::new(&remote).unwrap())
        .register("alice", &public_key)
        .await
        .unwrap();

    assert_eq!(
        registration.register(&provisional, "alice").await.unwrap(),
        identity
    );
    assert_eq!(crypto.public_key(&identity).unwrap(), Some(public_key));
    assert!(crypto.public_key(&provisional).unwrap().is_none());
}

#[tokio::test]
async fn test_register_resumes_after_migration() {
    let remote = common::spawn_relay().await;
    let (registration, crypto) = registration(&remote);
    let provisional = Identity::provisional();
    let public_key = crypto.obtain_public_key(&provisional).unwrap();

    // an earlier run migrated the keys but never saved its config
    let identity = SessionManagement::new(ApiClient::new(&remote).unwrap())
        .register("alice", &public_key)
        .await
        .unwrap();
    crypto.migrate(&provisional, &identity).unwrap();

    assert_eq!(
        registration.register(&provisional, "alice").await.unwrap(),
        identity
    );
    assert_eq!(crypto.public_key(&identity).unwrap(), Some(public_key));
    // no fresh keypair was generated along the way
    assert!(crypto.public_key(&provisional).unwrap().is_none());
}

#[tokio::test]
async fn test_register_alias_held_by_someone_else() {
    let remote = common::spawn_relay().await;
    TestUser::register(&remote, "alice").await;

    let (registration, crypto) = registration(&remote);
    let provisional = Identity::provisional();
    crypto.obtain_public_key(&provisional).unwrap();

    assert!(matches!(
        registration.register(&provisional, "alice").await,
        Err(RegistrationError::AliasTaken(alias)) if alias == "alice"
    ));
    // the local keys stay where they were
    assert!(crypto.public_key(&provisional).unwrap().is_some());
}
