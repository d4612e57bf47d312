//! Checkout orchestrator: cart snapshot to remote order.
//!
//! The cart is cleared only after the remote call reports success; a
//! network failure never empties it, so retry is simply calling
//! [`CheckoutOrchestrator::checkout`] again. A boolean guard rejects a
//! second submission while one is outstanding - no queueing, no
//! client-side timeout, no cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use copperpot_core::OrderId;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::models::{OrderItemRequest, OrderRequest};
use crate::storage::StorageError;

/// How long the caller should show the order confirmation before
/// auto-dismissing it.
pub const CONFIRMATION_TTL: Duration = Duration::from_secs(3);

/// Errors from a checkout attempt. The cart is untouched in every case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another checkout is still outstanding.
    #[error("a checkout is already in flight")]
    AlreadyInFlight,

    /// The order submission failed remotely or on the network.
    #[error("order submission failed: {0}")]
    Order(#[from] ApiError),

    /// The order was placed but clearing the persisted cart failed.
    #[error("order placed but clearing the cart failed: {0}")]
    ClearCart(#[from] StorageError),
}

impl CheckoutError {
    /// The message to surface to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Order(api) => api.user_message(),
            other => other.to_string(),
        }
    }
}

/// Successful checkout result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was accepted and the cart has been cleared.
    Placed {
        /// Order identifier, when the service returned one.
        order_id: Option<OrderId>,
        /// Confirmation auto-dismiss delay for the caller's UI.
        confirmation_ttl: Duration,
    },
    /// The cart was empty; nothing was submitted.
    EmptyCart,
}

/// Converts cart contents into an order submission and reconciles the
/// result back into the cart store.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    api: ApiClient,
    cart: CartStore,
    in_flight: Arc<AtomicBool>,
}

impl CheckoutOrchestrator {
    /// Create an orchestrator over the given API client and cart store.
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore) -> Self {
        Self {
            api,
            cart,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a checkout call is currently outstanding.
    ///
    /// The UI uses this as its loading flag.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the current cart as an order.
    ///
    /// An empty cart is tolerated and returns
    /// [`CheckoutOutcome::EmptyCart`] without touching the network. On
    /// success the cart store is cleared and the caller gets the
    /// confirmation TTL; on failure the cart is preserved for retry.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::AlreadyInFlight`] if called re-entrantly,
    /// [`CheckoutError::Order`] on remote failure.
    pub async fn checkout(&self) -> Result<CheckoutOutcome, CheckoutError> {
        // Ephemeral snapshot: exists only for the duration of this call.
        let submission = OrderRequest {
            items: self
                .cart
                .items()
                .iter()
                .map(|line| OrderItemRequest {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        };
        if submission.items.is_empty() {
            debug!("checkout invoked on empty cart; nothing to submit");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let order_id = match self.api.place_order(&submission).await {
            Ok(order_id) => order_id,
            Err(e) => {
                warn!(error = %e, "order submission failed; cart preserved for retry");
                return Err(CheckoutError::Order(e));
            }
        };

        self.cart.clear()?;
        debug!(?order_id, "order placed; cart cleared");
        Ok(CheckoutOutcome::Placed {
            order_id,
            confirmation_ttl: CONFIRMATION_TTL,
        })
    }
}

/// RAII flag for the single outstanding checkout.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, CheckoutError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::AlreadyInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_is_exclusive_and_resets() {
        let flag = AtomicBool::new(false);

        let guard = InFlightGuard::acquire(&flag).unwrap();
        assert!(matches!(
            InFlightGuard::acquire(&flag),
            Err(CheckoutError::AlreadyInFlight)
        ));

        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_user_message_for_in_flight() {
        assert_eq!(
            CheckoutError::AlreadyInFlight.user_message(),
            "a checkout is already in flight"
        );
    }

    #[test]
    fn test_user_message_passes_through_remote() {
        let err = CheckoutError::Order(ApiError::Remote {
            status: 400,
            message: Some("Product not found".to_owned()),
        });
        assert_eq!(err.user_message(), "Product not found");
    }
}
