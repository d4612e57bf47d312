//! Cart store: line items, stock ceilings, totals, persistence.
//!
//! The cart is an ordered sequence of line items keyed by product ID.
//! Every mutation enforces the stock invariant (`1 <= quantity <= ceiling`
//! whenever the ceiling is known), persists the whole cart through the
//! storage layer, and returns a non-blocking outcome value the UI renders
//! however it likes. Rejections never block the calling thread.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use copperpot_core::{Price, ProductId};

use crate::models::Product;
use crate::storage::{SharedStorage, StorageError, StorageExt, keys};

/// One product entry in the cart with its quantity and price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique key within the cart.
    pub product_id: ProductId,
    /// Product name as last seen in the catalog.
    pub name: String,
    /// Unit price snapshot taken when the line was created.
    pub unit_price: Price,
    /// Catalog image reference, if the product has one.
    pub image_ref: Option<String>,
    /// Always at least 1; removal is a separate operation.
    pub quantity: u32,
    /// Last-known available stock. `None` means no ceiling is known and
    /// only the lower bound is enforced.
    pub stock_ceiling: Option<u32>,
}

impl CartLine {
    /// `unit_price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The line was inserted or its quantity incremented.
    Added { quantity: u32 },
    /// The quantity already sits at the freshest known ceiling. The stored
    /// ceiling was still refreshed; nothing else changed.
    StockExhausted { ceiling: u32 },
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Quantity after the update (clamped to a minimum of 1).
    Updated { quantity: u32 },
    /// Incrementing would exceed the known ceiling; quantity unchanged.
    StockExhausted { ceiling: u32 },
    /// No line with that product ID exists.
    NotInCart,
}

/// Shared handle to the cart state.
///
/// Cheap to clone; all clones observe the same lines, the same storage and
/// the same revision channel. Mutations are synchronous and immediately
/// visible to every reader.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    lines: Mutex<Vec<CartLine>>,
    storage: SharedStorage,
    revision: watch::Sender<u64>,
}

impl CartStore {
    /// Load the cart from storage, or start empty.
    ///
    /// A missing or corrupt persisted cart yields an empty cart; that path
    /// is logged by the storage layer, never surfaced as an error.
    #[must_use]
    pub fn load(storage: SharedStorage) -> Self {
        let lines: Vec<CartLine> = storage.get_json(keys::CART).unwrap_or_default();
        if !lines.is_empty() {
            tracing::debug!(lines = lines.len(), "restored persisted cart");
        }
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(CartStoreInner {
                lines: Mutex::new(lines),
                storage,
                revision,
            }),
        }
    }

    /// Add one unit of `product` to the cart.
    ///
    /// A new product is inserted with quantity 1. An existing line is
    /// incremented unless its quantity already equals the effective
    /// ceiling - the incoming `stock_quantity` when known, else the stored
    /// one. Even on rejection the stored ceiling is refreshed to the
    /// incoming value, so the cart tracks the freshest stock the catalog
    /// has shown us. No network call is made.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if persisting the mutated cart fails.
    pub fn add_item(&self, product: &Product) -> Result<AddOutcome, StorageError> {
        let mut lines = self.lines();
        let incoming = product.stock_quantity;

        let outcome = if let Some(line) = lines.iter_mut().find(|l| l.product_id == product.id) {
            let effective = incoming.or(line.stock_ceiling);
            // Refresh the ceiling whether or not the add goes through.
            if incoming.is_some() {
                line.stock_ceiling = incoming;
            }
            match effective {
                Some(ceiling) if line.quantity >= ceiling => {
                    tracing::debug!(product_id = %product.id, ceiling, "add rejected: stock exhausted");
                    AddOutcome::StockExhausted { ceiling }
                }
                None => {
                    // Known hazard: a missing product record silently lifts
                    // the stock limit. Allowed, but loudly.
                    tracing::warn!(
                        product_id = %product.id,
                        quantity = line.quantity + 1,
                        "no stock ceiling known; allowing unbounded growth"
                    );
                    line.quantity += 1;
                    AddOutcome::Added {
                        quantity: line.quantity,
                    }
                }
                Some(_) => {
                    line.quantity += 1;
                    AddOutcome::Added {
                        quantity: line.quantity,
                    }
                }
            }
        } else {
            lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                image_ref: product.image_url.clone(),
                quantity: 1,
                stock_ceiling: incoming,
            });
            AddOutcome::Added { quantity: 1 }
        };

        self.persist(&lines)?;
        Ok(outcome)
    }

    /// Adjust a line's quantity by a signed delta (typically `+1`/`-1`).
    ///
    /// Any increment that would land past the known ceiling is rejected
    /// with the quantity unchanged. Decrementing clamps at 1; dropping a
    /// line is [`remove_item`](Self::remove_item), never a decrement.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if persisting the mutated cart fails.
    pub fn update_quantity(
        &self,
        product_id: ProductId,
        delta: i32,
    ) -> Result<UpdateOutcome, StorageError> {
        let mut lines = self.lines();
        let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(UpdateOutcome::NotInCart);
        };

        let next = line.quantity.saturating_add_signed(delta).max(1);
        if delta > 0
            && let Some(ceiling) = line.stock_ceiling
            && next > ceiling
        {
            tracing::debug!(%product_id, ceiling, "increment rejected: stock exhausted");
            return Ok(UpdateOutcome::StockExhausted { ceiling });
        }

        line.quantity = next;
        self.persist(&lines)?;
        Ok(UpdateOutcome::Updated { quantity: next })
    }

    /// Delete a line unconditionally. Unknown IDs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if persisting the mutated cart fails.
    pub fn remove_item(&self, product_id: ProductId) -> Result<(), StorageError> {
        let mut lines = self.lines();
        lines.retain(|l| l.product_id != product_id);
        self.persist(&lines)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if persisting the empty cart fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut lines = self.lines();
        lines.clear();
        self.persist(&lines)
    }

    /// `sum(unit_price * quantity)` over all lines, recomputed per call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines().iter().map(CartLine::line_total).sum()
    }

    /// Snapshot of the current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.lines().clone()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver's value is a revision counter; it changes on every
    /// successful mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn lines(&self) -> MutexGuard<'_, Vec<CartLine>> {
        self.inner
            .lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Write-through persist of the whole cart, then bump the revision.
    fn persist(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        self.inner.storage.put_json(keys::CART, &lines)?;
        self.inner.revision.send_modify(|r| *r += 1);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: i32, cents: u32, stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            price: Price::from_cents(cents),
            image_url: None,
            stock_quantity: stock,
            category_name: None,
        }
    }

    fn cart() -> CartStore {
        CartStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_new_item_quantity_one() {
        let cart = cart();
        let outcome = cart.add_item(&product(1, 999, Some(5))).unwrap();
        assert_eq!(outcome, AddOutcome::Added { quantity: 1 });

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].stock_ceiling, Some(5));
    }

    #[test]
    fn test_add_increments_existing_line() {
        let cart = cart();
        let p = product(3, 999, None);
        cart.add_item(&p).unwrap();
        let outcome = cart.add_item(&p).unwrap();
        assert_eq!(outcome, AddOutcome::Added { quantity: 2 });

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.total(), Price::from_cents(1998));
    }

    #[test]
    fn test_add_rejected_at_ceiling() {
        // Cart has {product 7, quantity 2, ceiling 2}; adding again is
        // rejected and quantity stays 2.
        let cart = cart();
        let p = product(7, 500, Some(2));
        cart.add_item(&p).unwrap();
        cart.add_item(&p).unwrap();

        let outcome = cart.add_item(&p).unwrap();
        assert_eq!(outcome, AddOutcome::StockExhausted { ceiling: 2 });
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_rejection_still_refreshes_ceiling() {
        let cart = cart();
        cart.add_item(&product(7, 500, Some(3))).unwrap();
        cart.update_quantity(ProductId::new(7), 1).unwrap();
        cart.update_quantity(ProductId::new(7), 1).unwrap();

        // Stock dropped to 3 -> at ceiling now; rejected but refreshed.
        let outcome = cart.add_item(&product(7, 500, Some(3))).unwrap();
        assert_eq!(outcome, AddOutcome::StockExhausted { ceiling: 3 });
        assert_eq!(cart.items()[0].stock_ceiling, Some(3));
    }

    #[test]
    fn test_incoming_ceiling_preferred_over_stored() {
        let cart = cart();
        cart.add_item(&product(7, 500, Some(10))).unwrap();

        // Freshest catalog read says only 1 in stock.
        let outcome = cart.add_item(&product(7, 500, Some(1))).unwrap();
        assert_eq!(outcome, AddOutcome::StockExhausted { ceiling: 1 });
        assert_eq!(cart.items()[0].stock_ceiling, Some(1));
    }

    #[test]
    fn test_unknown_ceiling_allows_growth() {
        let cart = cart();
        let p = product(3, 999, None);
        for _ in 0..4 {
            cart.add_item(&p).unwrap();
        }
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.items()[0].stock_ceiling, None);
    }

    #[test]
    fn test_quantity_never_exceeds_latest_ceiling() {
        // Arbitrary add/update sequence: quantity must track under the
        // most recently observed ceiling at every step.
        let cart = cart();
        let id = ProductId::new(9);
        cart.add_item(&product(9, 100, Some(4))).unwrap();
        for _ in 0..10 {
            cart.add_item(&product(9, 100, Some(4))).unwrap();
            cart.update_quantity(id, 1).unwrap();
        }
        let line = &cart.items()[0];
        assert!(line.quantity <= 4);
    }

    #[test]
    fn test_update_quantity_increment_and_ceiling() {
        let cart = cart();
        cart.add_item(&product(2, 100, Some(2))).unwrap();
        let id = ProductId::new(2);

        assert_eq!(
            cart.update_quantity(id, 1).unwrap(),
            UpdateOutcome::Updated { quantity: 2 }
        );
        assert_eq!(
            cart.update_quantity(id, 1).unwrap(),
            UpdateOutcome::StockExhausted { ceiling: 2 }
        );
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_update_quantity_large_delta_past_ceiling_rejected() {
        // A multi-unit increment must be checked against the post-delta
        // quantity, not quantity + 1.
        let cart = cart();
        cart.add_item(&product(7, 100, Some(3))).unwrap();
        let id = ProductId::new(7);
        cart.update_quantity(id, 1).unwrap();

        assert_eq!(
            cart.update_quantity(id, 2).unwrap(),
            UpdateOutcome::StockExhausted { ceiling: 3 }
        );
        assert_eq!(cart.items()[0].quantity, 2);

        // A delta that lands exactly on the ceiling is fine.
        assert_eq!(
            cart.update_quantity(id, 1).unwrap(),
            UpdateOutcome::Updated { quantity: 3 }
        );
    }

    #[test]
    fn test_update_quantity_clamps_at_one() {
        let cart = cart();
        cart.add_item(&product(2, 100, Some(5))).unwrap();
        let id = ProductId::new(2);

        assert_eq!(
            cart.update_quantity(id, -1).unwrap(),
            UpdateOutcome::Updated { quantity: 1 }
        );
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.len(), 1, "decrement must never remove the line");
    }

    #[test]
    fn test_update_quantity_unknown_id() {
        let cart = cart();
        assert_eq!(
            cart.update_quantity(ProductId::new(99), 1).unwrap(),
            UpdateOutcome::NotInCart
        );
    }

    #[test]
    fn test_remove_then_readd_starts_fresh() {
        let cart = cart();
        let p = product(5, 100, Some(10));
        cart.add_item(&p).unwrap();
        cart.add_item(&p).unwrap();
        cart.add_item(&p).unwrap();

        cart.remove_item(ProductId::new(5)).unwrap();
        assert!(cart.is_empty());

        cart.add_item(&p).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_total_empty_is_zero() {
        assert_eq!(cart().total(), Price::ZERO);
    }

    #[test]
    fn test_total_sums_lines() {
        let cart = cart();
        cart.add_item(&product(3, 999, None)).unwrap();
        cart.add_item(&product(3, 999, None)).unwrap();
        assert_eq!(cart.total(), Price::from_cents(1998));

        cart.add_item(&product(4, 50, None)).unwrap();
        assert_eq!(cart.total(), Price::from_cents(2048));
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(Arc::clone(&storage));
        cart.add_item(&product(1, 100, None)).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        let reloaded = CartStore::load(storage);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_persistence_roundtrip() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(Arc::clone(&storage));
        cart.add_item(&product(1, 999, Some(5))).unwrap();
        cart.add_item(&product(2, 50, None)).unwrap();
        cart.update_quantity(ProductId::new(1), 1).unwrap();

        let reloaded = CartStore::load(storage);
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total(), cart.total());
    }

    #[test]
    fn test_corrupt_persisted_cart_loads_empty() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        storage.put(keys::CART, "nonsense").unwrap();
        let cart = CartStore::load(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let cart = cart();
        let view = cart.clone();
        cart.add_item(&product(1, 100, None)).unwrap();
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_subscribe_bumps_on_mutation() {
        let cart = cart();
        let rx = cart.subscribe();
        let before = *rx.borrow();
        cart.add_item(&product(1, 100, None)).unwrap();
        assert!(*rx.borrow() > before);
    }
}
