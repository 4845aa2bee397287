//! Catalog commands: product and category listings.

use rust_decimal::Decimal;

use mercadito_core::{CategoryId, Product, ProductId};
use mercadito_engine::{Engine, EngineError, ProductInput};

/// List products, optionally narrowed by search text or category id.
pub async fn products(
    engine: &Engine,
    search: Option<&str>,
    category: Option<i64>,
) -> Result<(), EngineError> {
    let catalog = engine.catalog();

    let mut products = match category {
        Some(id) => catalog.products_by_category(CategoryId::new(id)).await?,
        None => catalog.list_products().await?,
    };

    if let Some(query) = search {
        let needle = query.trim().to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.brand.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
        });
    }

    print_products(&products);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }

    for product in products {
        println!(
            "{:>6}  {:<32} {:>10}  {}",
            product.id, product.name, product.price, product.category
        );
    }
    println!("{} product(s)", products.len());
}

/// Build a [`ProductInput`] from command-line arguments.
///
/// # Errors
///
/// Returns a message when the price does not parse as a decimal.
pub fn input(
    name: String,
    price: &str,
    description: String,
    brand: String,
    image_url: String,
) -> Result<ProductInput, String> {
    let price = price
        .trim()
        .parse::<Decimal>()
        .map_err(|_| format!("invalid price: {price}"))?;

    Ok(ProductInput {
        name,
        price,
        description,
        brand,
        image_url,
    })
}

/// Create a product under a category.
#[allow(clippy::print_stdout)]
pub async fn create(
    engine: &Engine,
    category: i64,
    product: &ProductInput,
) -> Result<(), EngineError> {
    engine
        .catalog()
        .create_product(CategoryId::new(category), product)
        .await?;
    println!("Created product {}", product.name);
    Ok(())
}

/// Replace a product's fields.
#[allow(clippy::print_stdout)]
pub async fn update(
    engine: &Engine,
    product_id: i64,
    product: &ProductInput,
) -> Result<(), EngineError> {
    engine
        .catalog()
        .update_product(ProductId::new(product_id), product)
        .await?;
    println!("Updated product {product_id}");
    Ok(())
}

/// Delete a product.
#[allow(clippy::print_stdout)]
pub async fn delete(engine: &Engine, product_id: i64) -> Result<(), EngineError> {
    engine.catalog().delete_product(ProductId::new(product_id)).await?;
    println!("Deleted product {product_id}");
    Ok(())
}

/// List category names, falling back to ones derived from the product
/// listing when the category endpoint is unavailable.
#[allow(clippy::print_stdout)]
pub async fn categories(engine: &Engine) {
    let names = engine.catalog().category_names().await;
    if names.is_empty() {
        println!("No categories available");
        return;
    }
    for name in names {
        println!("{name}");
    }
}
