//! Admin console views: catalog mutation.
//!
//! These commands sit behind the `RequireAdmin` gate policy; by the time
//! they run, the session has already been checked.

use std::path::Path;

use copperpot_core::{CategoryId, Price, ProductId};

use copperpot_client::models::NewProduct;
use copperpot_client::{AppState, Result};

/// Create a catalog product.
#[allow(clippy::print_stdout)]
pub async fn create_product(
    state: &AppState,
    name: String,
    price: Price,
    description: Option<String>,
    image_url: Option<String>,
    category_id: Option<i32>,
) -> Result<()> {
    let created = state
        .api()
        .create_product(&NewProduct {
            name,
            description,
            price,
            image_url,
            category_id: category_id.map(CategoryId::new),
        })
        .await?;
    println!("Created product #{}: {}", created.id, created.name);
    Ok(())
}

/// Update a catalog product.
#[allow(clippy::print_stdout)]
pub async fn update_product(
    state: &AppState,
    id: i32,
    name: String,
    price: Price,
    description: Option<String>,
    image_url: Option<String>,
    category_id: Option<i32>,
) -> Result<()> {
    let updated = state
        .api()
        .update_product(
            ProductId::new(id),
            &NewProduct {
                name,
                description,
                price,
                image_url,
                category_id: category_id.map(CategoryId::new),
            },
        )
        .await?;
    println!("Updated product #{}: {}", updated.id, updated.name);
    Ok(())
}

/// Bulk-upload products from a CSV file.
#[allow(clippy::print_stdout)]
pub async fn upload(state: &AppState, file: &Path) -> Result<()> {
    let contents = tokio::fs::read(file)
        .await
        .map_err(copperpot_client::storage::StorageError::from)?;
    let file_name = file
        .file_name()
        .map_or_else(|| "products.csv".to_owned(), |n| n.to_string_lossy().into_owned());
    let message = state.api().upload_products(file_name, contents).await?;
    println!("{message}");
    Ok(())
}
