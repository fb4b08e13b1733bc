use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use uuid::Uuid;

use common::prelude::{Identity, SharedItemCategory};

/// A record handed back by a category query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub from: Identity,
    pub data: String,
    pub key: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("alias is already registered")]
    AliasTaken,
    #[error("no user registered for alias")]
    UnknownAlias,
    #[error("unknown user: {0}")]
    UnknownUser(Identity),
    #[error("category {0} does not accept updates")]
    NotUpdatable(SharedItemCategory),
}

/// How long a session token stays valid when no other lifetime is configured
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// In-memory relay storage
///
/// The relay only ever sees opaque strings: base64 public keys, wrapped keys and
///  ciphertexts. Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct State {
    inner: Arc<RwLock<StateInner>>,
    session_ttl: Duration,
}

impl Default for State {
    fn default() -> Self {
        Self::with_session_ttl(DEFAULT_SESSION_TTL)
    }
}

#[derive(Debug, Default)]
struct StateInner {
    /// identity -> base64 public key
    users: HashMap<Identity, String>,
    /// alias hash -> identity
    aliases: HashMap<String, Identity>,
    /// session token -> (identity, opened at)
    sessions: HashMap<String, (Identity, Instant)>,
    /// target -> pending handshakes, at most one per sender
    handshakes: HashMap<Identity, Vec<StoredItem>>,
    /// (from, to) -> wrapped session key
    keys: HashMap<(Identity, Identity), String>,
    /// latest payload per (category, sender)
    shared: HashMap<(SharedItemCategory, Identity), String>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            session_ttl,
        }
    }

    pub fn register(&self, alias_hash: &str, public_key: &str) -> Result<Identity, StateError> {
        let mut inner = self.inner.write();
        if inner.aliases.contains_key(alias_hash) {
            return Err(StateError::AliasTaken);
        }

        let identity = Identity::from(Uuid::new_v4());
        inner.aliases.insert(alias_hash.to_string(), identity);
        inner.users.insert(identity, public_key.to_string());
        Ok(identity)
    }

    pub fn lookup_alias(&self, alias_hash: &str) -> Result<Identity, StateError> {
        self.inner
            .read()
            .aliases
            .get(alias_hash)
            .copied()
            .ok_or(StateError::UnknownAlias)
    }

    pub fn public_key(&self, identity: &Identity) -> Result<String, StateError> {
        self.inner
            .read()
            .users
            .get(identity)
            .cloned()
            .ok_or(StateError::UnknownUser(*identity))
    }

    /// Open a session for a user and return its token
    ///
    /// Expired sessions are swept on the way.
    pub fn open_session(&self, identity: Identity) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let ttl = self.session_ttl;
        let mut inner = self.inner.write();
        inner
            .sessions
            .retain(|_, (_, opened)| opened.elapsed() < ttl);
        inner
            .sessions
            .insert(token.clone(), (identity, Instant::now()));
        token
    }

    /// Close every session of the token's owner
    ///
    /// Logging out from one client logs the user out everywhere.
    pub fn close_session(&self, token: &str) -> Option<Identity> {
        let mut inner = self.inner.write();
        let (identity, _) = inner.sessions.remove(token)?;
        inner.sessions.retain(|_, (owner, _)| *owner != identity);
        Some(identity)
    }

    pub fn session_identity(&self, token: &str) -> Option<Identity> {
        self.inner
            .read()
            .sessions
            .get(token)
            .filter(|(_, opened)| opened.elapsed() < self.session_ttl)
            .map(|(identity, _)| *identity)
    }

    pub fn session_count(&self) -> usize {
        self.inner.read().sessions.len()
    }

    /// Leave a handshake for `to`, replacing any earlier one from the same sender
    pub fn handshake(&self, from: Identity, to: &Identity, seed: &str) -> Result<(), StateError> {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(to) {
            return Err(StateError::UnknownUser(*to));
        }

        let inbox = inner.handshakes.entry(*to).or_default();
        inbox.retain(|item| item.from != from);
        inbox.push(StoredItem {
            from,
            data: seed.to_string(),
            key: None,
        });
        Ok(())
    }

    /// Store wrapped keys from one sender; nothing is stored if any recipient is unknown
    ///
    /// Pushing a key to someone answers their pending handshake, so it leaves the
    ///  sender's inbox.
    pub fn put_keys(&self, from: Identity, keys: &[(Identity, String)]) -> Result<(), StateError> {
        let mut inner = self.inner.write();
        if let Some((to, _)) = keys.iter().find(|(to, _)| !inner.users.contains_key(to)) {
            return Err(StateError::UnknownUser(*to));
        }
        for (to, key) in keys {
            inner.keys.insert((from, *to), key.clone());
        }
        if let Some(inbox) = inner.handshakes.get_mut(&from) {
            inbox.retain(|item| !keys.iter().any(|(to, _)| *to == item.from));
        }
        Ok(())
    }

    pub fn update(
        &self,
        from: Identity,
        category: SharedItemCategory,
        data: &str,
    ) -> Result<(), StateError> {
        if !category.is_updatable() {
            return Err(StateError::NotUpdatable(category));
        }
        self.inner
            .write()
            .shared
            .insert((category, from), data.to_string());
        Ok(())
    }

    /// Everything in `category` the caller may see
    ///
    /// Handshakes are addressed to the caller directly. Shared payloads are visible
    ///  once their sender has pushed a wrapped key to the caller, and carry that key.
    pub fn query(&self, caller: &Identity, category: SharedItemCategory) -> Vec<StoredItem> {
        let inner = self.inner.read();
        match category {
            SharedItemCategory::Handshake => {
                inner.handshakes.get(caller).cloned().unwrap_or_default()
            }
            category => inner
                .keys
                .iter()
                .filter(|((_, to), _)| to == caller)
                .filter_map(|((from, _), key)| {
                    inner.shared.get(&(category, *from)).map(|data| StoredItem {
                        from: *from,
                        data: data.clone(),
                        key: Some(key.clone()),
                    })
                })
                .collect(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }
}
