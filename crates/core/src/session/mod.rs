//! Session store: the authenticated identity and where it is persisted.
//!
//! The store owns two [`Storage`] scopes:
//!
//! - **durable** - survives client restarts ("remember me")
//! - **session** - ends with the client process
//!
//! At most one identity is active. It is written to exactly one scope, chosen
//! at sign-in. Signing in also removes any identity left in the other scope,
//! so [`SessionStore::restore`]'s durable-first precedence can never bring
//! back a stale identity from an earlier sign-in. Any bearer token from the
//! earlier sign-in is dropped from both scopes for the same reason.
//!
//! The store is read and written synchronously by its single owner; it holds
//! no locks.

mod identity;
mod storage;

pub use identity::Identity;
pub use storage::{MemoryStorage, Storage, StorageError};

use tracing::{info, warn};

use crate::types::Role;

/// Storage keys used by the session store.
pub mod keys {
    /// Key holding the JSON-serialized [`Identity`](super::Identity).
    pub const USER: &str = "user";

    /// Key holding the backend bearer token.
    pub const TOKEN: &str = "token";

    /// Session-scope flag set once a visitor has picked an option from the
    /// welcome screen.
    pub const WELCOME_CHOICE: &str = "welcome_choice_made";
}

/// Holds the signed-in identity and persists it across the two scopes.
#[derive(Debug)]
pub struct SessionStore<D, S> {
    durable: D,
    session: S,
    identity: Option<Identity>,
    loading: bool,
}

impl<D: Storage, S: Storage> SessionStore<D, S> {
    /// Create a store over the two scopes. Call [`SessionStore::restore`]
    /// before reading the identity.
    pub const fn new(durable: D, session: S) -> Self {
        Self {
            durable,
            session,
            identity: None,
            loading: true,
        }
    }

    /// Load the persisted identity, durable scope first.
    ///
    /// Corrupt data is logged, removed from both scopes and treated as "no
    /// identity"; an unreadable scope is logged and skipped.
    pub fn restore(&mut self) -> Option<&Identity> {
        let saved = read_user(&self.durable, "durable").or_else(|| read_user(&self.session, "session"));

        self.identity = match saved {
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt persisted identity");
                    self.discard(keys::USER);
                    None
                }
            },
            None => None,
        };
        self.loading = false;

        self.identity.as_ref()
    }

    /// Sign in.
    ///
    /// Writes the identity to the durable scope when `remember` is set,
    /// otherwise to the session scope, after removing it from the other one.
    /// The previous bearer token is removed from both scopes; store the new
    /// one with [`SessionStore::set_token`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or either scope fails. The
    /// identity stays active in memory for this process either way.
    pub fn login(&mut self, identity: Identity, remember: bool) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&identity)?;
        info!(user_id = %identity.id, role = %identity.role, remember, "Signed in");
        self.identity = Some(identity);

        let (chosen, other) = self.scopes_mut(remember);
        other.remove_item(keys::USER)?;
        other.remove_item(keys::TOKEN)?;
        chosen.remove_item(keys::TOKEN)?;
        chosen.set_item(keys::USER, &serialized)
    }

    /// Sign out: forget the identity and remove the identity and token from
    /// both scopes.
    ///
    /// # Errors
    ///
    /// Every removal is attempted; the first failure is returned.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        if let Some(identity) = self.identity.take() {
            info!(user_id = %identity.id, "Signed out");
        }

        let mut first_err = None;
        for key in [keys::USER, keys::TOKEN] {
            for result in [self.durable.remove_item(key), self.session.remove_item(key)] {
                if let Err(e) = result {
                    warn!(key, error = %e, "Failed to clear session storage");
                    first_err.get_or_insert(e);
                }
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Store the backend bearer token in the scope chosen by `remember`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either scope fails.
    pub fn set_token(&mut self, token: &str, remember: bool) -> Result<(), StorageError> {
        let (chosen, other) = self.scopes_mut(remember);
        other.remove_item(keys::TOKEN)?;
        chosen.set_item(keys::TOKEN, token)
    }

    /// The stored bearer token, durable scope first.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let read = |storage: &dyn Storage| storage.get_item(keys::TOKEN).ok().flatten();
        read(&self.durable).or_else(|| read(&self.session))
    }

    /// Whether the welcome choice was made during this session.
    #[must_use]
    pub fn welcome_choice_made(&self) -> bool {
        self.session
            .get_item(keys::WELCOME_CHOICE)
            .ok()
            .flatten()
            .is_some_and(|v| v == "true")
    }

    /// Record the welcome choice. Lives in the session scope only, so a new
    /// session shows the welcome screen again.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session scope fails.
    pub fn make_welcome_choice(&mut self) -> Result<(), StorageError> {
        self.session.set_item(keys::WELCOME_CHOICE, "true")
    }

    /// The active identity.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether an identity is active.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether [`SessionStore::restore`] has not run yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Role of the active identity.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }

    #[must_use]
    pub fn is_cashier(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_cashier)
    }

    #[must_use]
    pub fn is_kitchen(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_kitchen)
    }

    #[must_use]
    pub fn is_waiter(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_waiter)
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_client)
    }

    /// The durable scope.
    pub const fn durable(&self) -> &D {
        &self.durable
    }

    /// The session scope.
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Give back both scopes, dropping the in-memory identity.
    pub fn into_parts(self) -> (D, S) {
        (self.durable, self.session)
    }

    /// `(chosen, other)` scopes for a sign-in.
    fn scopes_mut(&mut self, remember: bool) -> (&mut dyn Storage, &mut dyn Storage) {
        if remember {
            (&mut self.durable, &mut self.session)
        } else {
            (&mut self.session, &mut self.durable)
        }
    }

    /// Best-effort removal of a key from both scopes.
    fn discard(&mut self, key: &str) {
        for result in [self.durable.remove_item(key), self.session.remove_item(key)] {
            if let Err(e) = result {
                warn!(key, error = %e, "Failed to discard persisted value");
            }
        }
    }
}

fn read_user(storage: &dyn Storage, scope: &str) -> Option<String> {
    match storage.get_item(keys::USER) {
        Ok(value) => value,
        Err(e) => {
            warn!(scope, error = %e, "Failed to read persisted identity");
            None
        }
    }
}
