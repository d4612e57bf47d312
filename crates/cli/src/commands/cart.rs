//! Cart and checkout views.

use copperpot_core::ProductId;

use copperpot_client::cart::{AddOutcome, UpdateOutcome};
use copperpot_client::checkout::{CheckoutError, CheckoutOutcome};
use copperpot_client::{AppState, Result};

/// Show cart contents and the running total.
#[allow(clippy::print_stdout)]
pub fn show(state: &AppState) -> Result<()> {
    let items = state.cart().items();
    if items.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for line in &items {
        println!(
            "#{:<5} {:<30} x{:<3} @ {} = {}",
            line.product_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        );
    }
    println!("{:>56}", format!("Total: {}", state.cart().total()));
    Ok(())
}

/// Add one unit of a product, refreshing its stock ceiling from the
/// catalog on the way in.
#[allow(clippy::print_stdout)]
pub async fn add(state: &AppState, id: i32) -> Result<()> {
    let product = state.api().product(ProductId::new(id)).await?;
    match state.cart().add_item(&product)? {
        AddOutcome::Added { quantity } => {
            println!("Added {} (x{quantity} in cart).", product.name);
        }
        AddOutcome::StockExhausted { ceiling } => {
            println!("Cannot add more. Only {ceiling} in stock.");
        }
    }
    Ok(())
}

/// Increment or decrement a line's quantity.
#[allow(clippy::print_stdout)]
pub fn adjust(state: &AppState, id: i32, delta: i32) -> Result<()> {
    match state.cart().update_quantity(ProductId::new(id), delta)? {
        UpdateOutcome::Updated { quantity } => println!("Quantity is now {quantity}."),
        UpdateOutcome::StockExhausted { ceiling } => {
            println!("Cannot add more. Only {ceiling} in stock.");
        }
        UpdateOutcome::NotInCart => println!("Product #{id} is not in your cart."),
    }
    Ok(())
}

/// Remove a line from the cart.
#[allow(clippy::print_stdout)]
pub fn remove(state: &AppState, id: i32) -> Result<()> {
    state.cart().remove_item(ProductId::new(id))?;
    println!("Removed product #{id}.");
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(state: &AppState) -> Result<()> {
    state.cart().clear()?;
    println!("Cart cleared.");
    Ok(())
}

/// Submit the cart as an order.
///
/// On failure the cart is untouched; running `checkout` again retries
/// the same submission.
#[allow(clippy::print_stdout)]
pub async fn checkout(state: &AppState) -> Result<()> {
    let total = state.cart().total();
    match state.checkout().checkout().await {
        Ok(CheckoutOutcome::Placed { order_id, .. }) => {
            match order_id {
                Some(order_id) => println!("Order #{order_id} placed - {total}. Thank you!"),
                None => println!("Order placed - {total}. Thank you!"),
            }
            Ok(())
        }
        Ok(CheckoutOutcome::EmptyCart) => {
            println!("Your cart is empty; nothing to check out.");
            Ok(())
        }
        Err(e @ CheckoutError::AlreadyInFlight) => {
            println!("{}", e.user_message());
            Ok(())
        }
        Err(e) => {
            println!("{} Your cart is unchanged; try again.", e.user_message());
            Err(e.into())
        }
    }
}
