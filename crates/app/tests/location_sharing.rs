mod common;

use ::common::prelude::{Location, SharedItemCategory};
use common::TestUser;
use friends::services::HandshakeState;

#[tokio::test]
async fn test_friends_see_each_others_locations() {
    let remote = common::spawn_relay().await;
    let alice = TestUser::register(&remote, "alice").await;
    let bob = TestUser::register(&remote, "bob").await;
    let eve = TestUser::register(&remote, "eve").await;

    let handshake = alice.handshake();
    handshake.initiate(&bob.identity).await.unwrap();
    assert_eq!(handshake.state(&bob.identity), HandshakeState::Initiated);

    let bob_handshake = bob.handshake();
    let from = bob_handshake.accept().await.unwrap();
    assert_eq!(bob_handshake.state(&from), HandshakeState::Accepted);

    alice.friends().add_friend(&alice.identity, &bob.identity).await.unwrap();
    bob.friends().add_friend(&bob.identity, &from).await.unwrap();

    let berlin = Location::new(52.52, 13.405).unwrap();
    let paris = Location::new(48.8566, 2.3522).unwrap();
    alice
        .locations()
        .share_location(&alice.identity, &berlin)
        .await
        .unwrap();
    bob.locations()
        .share_location(&bob.identity, &paris)
        .await
        .unwrap();

    assert_eq!(
        bob.locations().friend_locations(&bob.identity).await.unwrap(),
        vec![(alice.identity, berlin)]
    );
    assert_eq!(
        alice.locations().friend_locations(&alice.identity).await.unwrap(),
        vec![(bob.identity, paris)]
    );

    // eve never got a key and sees nothing
    assert!(eve
        .locations()
        .friend_locations(&eve.identity)
        .await
        .unwrap()
        .is_empty());

    // a newer location replaces the old one
    let rome = Location::new(41.9028, 12.4964).unwrap();
    alice
        .locations()
        .share_location(&alice.identity, &rome)
        .await
        .unwrap();
    assert_eq!(
        bob.locations().friend_locations(&bob.identity).await.unwrap(),
        vec![(alice.identity, rome)]
    );
}

#[tokio::test]
async fn test_undecryptable_items_are_skipped() {
    let remote = common::spawn_relay().await;
    let alice = TestUser::register(&remote, "alice").await;
    let bob = TestUser::register(&remote, "bob").await;

    alice.friends().add_friend(&alice.identity, &bob.identity).await.unwrap();
    alice
        .shared_data()
        .update(SharedItemCategory::Location, "bm90IGEgY2lwaGVydGV4dA==".into())
        .await
        .unwrap();

    let items = bob
        .shared_data()
        .query(SharedItemCategory::Location)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(bob
        .locations()
        .friend_locations(&bob.identity)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_removed_friend_cannot_be_wrapped_for() {
    let remote = common::spawn_relay().await;
    let alice = TestUser::register(&remote, "alice").await;
    let bob = TestUser::register(&remote, "bob").await;

    let friends = alice.friends();
    friends.add_friend(&alice.identity, &bob.identity).await.unwrap();
    friends.remove_friend(&alice.identity, &bob.identity).unwrap();

    assert!(alice
        .crypto
        .encrypt_session_key(&alice.identity, &bob.identity)
        .is_err());
}
