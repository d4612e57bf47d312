//! Application state shared across views.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::CheckoutOrchestrator;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::SessionStore;
use crate::storage::{FileStorage, SharedStorage};

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and is the single injection
/// point for session, cart, checkout, and API access. Views never reach
/// for storage directly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    sessions: SessionStore,
    cart: CartStore,
    api: ApiClient,
    checkout: CheckoutOrchestrator,
}

impl AppState {
    /// Create application state over file-backed storage at the
    /// configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage document or HTTP client cannot be
    /// set up.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage: SharedStorage = Arc::new(FileStorage::open(&config.storage_path)?);
        Self::with_storage(config, storage)
    }

    /// Create application state over an injected storage backend.
    ///
    /// Tests use this with
    /// [`MemoryStorage`](crate::storage::MemoryStorage).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_storage(config: ClientConfig, storage: SharedStorage) -> Result<Self> {
        let sessions = SessionStore::new(Arc::clone(&storage));
        let cart = CartStore::load(storage);
        let api = ApiClient::new(
            config.api_base_url.clone(),
            config.http_timeout,
            sessions.clone(),
        )?;
        let checkout = CheckoutOrchestrator::new(api.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                cart,
                api,
                checkout,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.inner.checkout
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig {
            api_base_url: url::Url::parse("http://localhost:8080/").unwrap(),
            storage_path: PathBuf::from("unused.json"),
            http_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_stores_share_one_storage() {
        let state = AppState::with_storage(config(), Arc::new(MemoryStorage::new())).unwrap();
        state
            .sessions()
            .login("tok", "CUSTOMER", "Sam", "Shopper")
            .unwrap();

        // A clone of the state observes the same session.
        let view = state.clone();
        assert!(view.sessions().is_authenticated());
    }
}
