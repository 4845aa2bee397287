//! Order commands.

use mercadito_core::{Order, OrderId, OrderStatus};
use mercadito_engine::{Engine, EngineError};

/// List the logged-in user's orders.
pub async fn list(engine: &Engine) -> Result<(), EngineError> {
    let orders = engine.orders().my_orders().await?;
    print_orders(&orders);
    Ok(())
}

/// List every order in the system (admin).
pub async fn list_all(engine: &Engine) -> Result<(), EngineError> {
    let orders = engine.orders().all_orders().await?;
    print_orders(&orders);
    Ok(())
}

/// Place an order from the server-side cart.
#[allow(clippy::print_stdout)]
pub async fn place(engine: &Engine) -> Result<(), EngineError> {
    match engine.orders().place_order().await? {
        Some(order) => println!("Order {} placed, total {}", order.id, order.total),
        None => println!("Order placed"),
    }
    Ok(())
}

/// Update an order's lifecycle state (admin).
#[allow(clippy::print_stdout)]
pub async fn set_status(engine: &Engine, order_id: i64, status: &str) -> Result<(), EngineError> {
    let status = OrderStatus::from(status.to_string());
    engine
        .orders()
        .update_status(OrderId::new(order_id), &status)
        .await?;
    println!("Order {order_id} is now {status}");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders");
        return;
    }

    for order in orders {
        println!(
            "{:>6}  {:<12} {:>10}  {}",
            order.id,
            order.status.to_string(),
            order.total,
            order.placed_at
        );
        for line in &order.lines {
            println!(
                "        {:<32} {:>4} x {:>10} = {:>10}",
                line.name, line.quantity, line.unit_price, line.subtotal
            );
        }
    }
    println!("{} order(s)", orders.len());
}
