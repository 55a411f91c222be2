//! Client state owned by the running command or shell.
//!
//! There are no globals: `AppState` owns the session store, the cart, the
//! API client and the per-view load generations, and commands borrow it.

use secrecy::SecretString;
use tracing::debug;

use sabor_core::fetch::ViewGeneration;
use sabor_core::{ApiStatus, Cart, MemoryStorage, SessionStore, Storage};

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::error::{AppError, set_sentry_user};
use crate::services::cashier::CashierDesk;
use crate::storage::FileStorage;

/// Load generations, one per view that fetches.
#[derive(Debug, Default)]
pub struct Views {
    pub home: ViewGeneration,
    pub products: ViewGeneration,
    pub product: ViewGeneration,
    pub menu: ViewGeneration,
    pub users: ViewGeneration,
}

impl Views {
    /// Tear every view down.
    pub const fn invalidate_all(&mut self) {
        self.home.invalidate();
        self.products.invalidate();
        self.product.invalidate();
        self.menu.invalidate();
        self.users.invalidate();
    }
}

/// Everything the client holds for one process.
///
/// `D` is the durable storage scope; the session scope is always in memory
/// and ends with the process.
#[derive(Debug)]
pub struct AppState<D: Storage = FileStorage> {
    api: ApiClient,
    /// The client as configured, before any session token.
    signed_out_api: ApiClient,
    session: SessionStore<D, MemoryStorage>,
    cart: Cart,
    api_status: ApiStatus,
    cashier: Option<CashierDesk>,
    pub views: Views,
}

impl AppState<FileStorage> {
    /// Build the state from configuration and restore any saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::from_config(config)?;
        let durable = FileStorage::new(config.storage_path());
        Ok(Self::new(api, durable))
    }
}

impl<D: Storage> AppState<D> {
    /// Build the state over a durable scope and restore any saved session.
    pub fn new(api: ApiClient, durable: D) -> Self {
        let signed_out_api = api.clone();
        let mut api = api;
        let mut session = SessionStore::new(durable, MemoryStorage::new());

        if let Some(identity) = session.restore() {
            debug!(user_id = %identity.id, role = %identity.role, "Restored session");
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
        }
        if let Some(token) = session.token() {
            api.set_token(Some(SecretString::from(token)));
        }

        Self {
            api,
            signed_out_api,
            session,
            cart: Cart::new(),
            api_status: ApiStatus::default(),
            cashier: None,
            views: Views::default(),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore<D, MemoryStorage> {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut SessionStore<D, MemoryStorage> {
        &mut self.session
    }

    /// The API client and session store together, for flows that need both.
    pub const fn api_and_session(&mut self) -> (&ApiClient, &mut SessionStore<D, MemoryStorage>) {
        (&self.api, &mut self.session)
    }

    /// Use the bearer token issued at sign-in for later requests. Without
    /// one, later requests go out signed out, never with an earlier user's
    /// token.
    pub fn use_token(&mut self, token: Option<SecretString>) {
        self.api = self.signed_out_api.clone();
        if token.is_some() {
            self.api.set_token(token);
        }
    }

    /// Forget the signed-in user's state: token, cashier desk, open views.
    pub fn forget_user(&mut self) {
        self.api = self.signed_out_api.clone();
        self.cashier = None;
        self.views.invalidate_all();
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub const fn api_status(&self) -> ApiStatus {
        self.api_status
    }

    pub const fn set_api_status(&mut self, status: ApiStatus) {
        self.api_status = status;
    }

    /// The cashier desk, opening it on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the signed-in identity may not
    /// operate the register.
    pub fn cashier(&mut self) -> Result<&mut CashierDesk, AppError> {
        let allowed = self
            .session
            .identity()
            .is_some_and(|i| i.role.can_operate_register());

        let desk = match self.cashier.take() {
            Some(desk) if allowed => desk,
            _ => CashierDesk::open(self.session.identity())?,
        };
        Ok(self.cashier.insert(desk))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sabor_core::session::keys;
    use sabor_core::{Identity, Role, UserId};
    use std::time::Duration;
    use url::Url;

    fn api() -> ApiClient {
        ApiClient::new(&Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(1)).unwrap()
    }

    fn durable_with(identity: &Identity, token: Option<&str>) -> MemoryStorage {
        let mut durable = MemoryStorage::new();
        durable
            .set_item(keys::USER, &serde_json::to_string(identity).unwrap())
            .unwrap();
        if let Some(token) = token {
            durable.set_item(keys::TOKEN, token).unwrap();
        }
        durable
    }

    fn cashier() -> Identity {
        Identity {
            id: UserId::new(3),
            name: "Camila".to_string(),
            email: "camila@saboryfuego.cl".to_string(),
            role: Role::Cashier,
        }
    }

    #[test]
    fn test_new_restores_session_and_token() {
        let state = AppState::new(api(), durable_with(&cashier(), Some("tok-1")));
        assert!(!state.session().is_loading());
        assert!(state.session().is_cashier());
        assert!(state.api().has_token());
        assert_eq!(state.api_status(), ApiStatus::Checking);
        assert!(state.cart().is_empty());
    }

    #[test]
    fn test_cashier_desk_requires_role() {
        let mut state = AppState::new(api(), MemoryStorage::new());
        assert!(state.cashier().is_err());

        let mut state = AppState::new(api(), durable_with(&cashier(), None));
        state.cashier().unwrap().ring_up(sabor_core::ProductId::new(2)).unwrap();
        // Same desk on the next call
        assert_eq!(state.cashier().unwrap().order().items().len(), 1);
    }

    #[test]
    fn test_sign_in_without_token_drops_previous_one() {
        let mut state = AppState::new(api(), durable_with(&cashier(), Some("tok-A")));
        assert!(state.api().has_token());

        state.use_token(None);
        assert!(!state.api().has_token());

        state.use_token(Some(SecretString::from("tok-B")));
        assert!(state.api().has_token());
    }

    #[test]
    fn test_forget_user_closes_desk_and_views() {
        let mut state = AppState::new(api(), durable_with(&cashier(), Some("tok-1")));
        state.cashier().unwrap();
        let ticket = state.views.products.begin();

        state.session_mut().logout().unwrap();
        state.forget_user();

        assert!(!state.api().has_token());
        assert!(!state.views.products.is_current(ticket));
        assert!(state.cashier().is_err());
    }
}
