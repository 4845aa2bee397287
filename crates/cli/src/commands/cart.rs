//! Cart commands.

use mercadito_core::ProductId;
use mercadito_engine::{Engine, EngineError};

/// Show the reconciled cart: server lines when the service answers,
/// otherwise the local snapshot.
#[allow(clippy::print_stdout)]
pub async fn show(engine: &Engine) {
    let view = engine.cart().view(engine.catalog()).await;

    if view.lines.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in &view.lines {
        println!(
            "{:>6}  {:<32} {:>4} x {:>10} = {:>10}",
            line.product_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        );
    }
    println!("Total: {}", view.total);
}

/// Add a product to the cart.
#[allow(clippy::print_stdout)]
pub async fn add(engine: &Engine, product_id: i64, quantity: u32) -> Result<(), EngineError> {
    engine.cart().add(ProductId::new(product_id), quantity).await?;
    println!("Added product {product_id} (x{})", quantity.max(1));
    println!("Cart count: {}", engine.cart().badge().await);
    Ok(())
}

/// Set a line's quantity. Zero removes the line.
#[allow(clippy::print_stdout)]
pub async fn set(engine: &Engine, product_id: i64, quantity: u32) -> Result<(), EngineError> {
    engine
        .cart()
        .set_quantity(ProductId::new(product_id), quantity)
        .await?;
    if quantity == 0 {
        println!("Removed product {product_id}");
    } else {
        println!("Product {product_id} set to {quantity}");
    }
    Ok(())
}

/// Remove a line.
#[allow(clippy::print_stdout)]
pub async fn remove(engine: &Engine, product_id: i64) -> Result<(), EngineError> {
    engine.cart().remove(ProductId::new(product_id)).await?;
    println!("Removed product {product_id}");
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub async fn clear(engine: &Engine) -> Result<(), EngineError> {
    engine.cart().clear().await?;
    println!("Cart cleared");
    Ok(())
}
