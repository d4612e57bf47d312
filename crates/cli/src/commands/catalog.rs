//! Catalog browsing views.

use copperpot_core::ProductId;

use copperpot_client::{AppState, Result};

/// List the product catalog (the default landing view).
#[allow(clippy::print_stdout)]
pub async fn browse(state: &AppState) -> Result<()> {
    let products = state.api().products().await?;
    if products.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    for product in &products {
        let stock = product
            .stock_quantity
            .map_or_else(|| "stock unknown".to_owned(), |n| format!("{n} in stock"));
        let category = product.category_name.as_deref().unwrap_or("uncategorized");
        println!(
            "#{:<5} {:<30} {:>10}  [{category}] ({stock})",
            product.id, product.name, product.price.to_string()
        );
    }
    Ok(())
}

/// Show one product in detail.
#[allow(clippy::print_stdout)]
pub async fn product(state: &AppState, id: i32) -> Result<()> {
    let product = state.api().product(ProductId::new(id)).await?;
    println!("#{} {}", product.id, product.name);
    println!("  price:    {}", product.price);
    if let Some(description) = &product.description {
        println!("  about:    {description}");
    }
    if let Some(stock) = product.stock_quantity {
        println!("  stock:    {stock}");
    }
    if let Some(category) = &product.category_name {
        println!("  category: {category}");
    }
    if let Some(image) = &product.image_url {
        println!("  image:    {image}");
    }
    Ok(())
}

/// List catalog categories.
#[allow(clippy::print_stdout)]
pub async fn categories(state: &AppState) -> Result<()> {
    let categories = state.api().categories().await?;
    for category in &categories {
        match &category.description {
            Some(description) => println!("#{:<5} {} - {description}", category.id, category.name),
            None => println!("#{:<5} {}", category.id, category.name),
        }
    }
    Ok(())
}

/// Show the session's order history.
#[allow(clippy::print_stdout)]
pub async fn orders(state: &AppState) -> Result<()> {
    let orders = state.api().orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders {
        println!(
            "Order #{} - {} - {}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.total_amount
        );
        for line in &order.items {
            println!(
                "    {} x{} @ {}",
                line.product_name, line.quantity, line.price
            );
        }
    }
    Ok(())
}
