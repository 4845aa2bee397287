//! Mercadito CLI - storefront operations from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (session persists in the state file)
//! mercadito login -e ana@example.com -p secret
//!
//! # Browse the catalog
//! mercadito products
//! mercadito products --search zapatilla
//! mercadito categories
//!
//! # Work the cart
//! mercadito cart add 3 --quantity 2
//! mercadito cart show
//! mercadito cart clear
//!
//! # Orders
//! mercadito orders place
//! mercadito orders list
//! ```
//!
//! Backend base URLs come from `MERCADITO_*_BASE` environment variables;
//! session and cart snapshot live in the file named by
//! `MERCADITO_STATE_FILE` (default `.mercadito-state.json`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use mercadito_engine::{Engine, EngineConfig};

mod commands;
mod store;

#[derive(Parser)]
#[command(name = "mercadito")]
#[command(author, version, about = "Mercadito storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Clear the session and local cart
    Logout,
    /// Show the current session
    Whoami,
    /// List products, optionally filtered
    Products {
        /// Case-insensitive substring filter
        #[arg(short, long)]
        search: Option<String>,

        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<i64>,
    },
    /// List category names
    Categories,
    /// Manage catalog products (admin)
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Work with the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Work with orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the reconciled cart
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: i64,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        /// Product id
        product_id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Product id
        product_id: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product under a category
    Create {
        /// Category id the product belongs to
        #[arg(short, long)]
        category: i64,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price, e.g. 49.90
        #[arg(short, long)]
        price: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Brand name
        #[arg(short, long, default_value = "")]
        brand: String,

        /// Image URL
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Replace a product's fields
    Update {
        /// Product id
        product_id: i64,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price, e.g. 49.90
        #[arg(short, long)]
        price: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Brand name
        #[arg(short, long, default_value = "")]
        brand: String,

        /// Image URL
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Delete a product
    Delete {
        /// Product id
        product_id: i64,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Place an order from the server-side cart
    Place,
    /// List all orders (admin)
    All,
    /// Update an order's state (admin)
    SetStatus {
        /// Order id
        order_id: i64,

        /// New state, e.g. PAGADO or ENVIADO
        status: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let engine = Engine::new(&config, Arc::new(store::FileStore::from_env()));

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&engine, &email, &password).await?;
        }
        Commands::Register { email, password } => {
            commands::session::register(&engine, &email, &password).await?;
        }
        Commands::Logout => commands::session::logout(&engine).await,
        Commands::Whoami => commands::session::whoami(&engine),
        Commands::Products { search, category } => {
            commands::catalog::products(&engine, search.as_deref(), category).await?;
        }
        Commands::Categories => commands::catalog::categories(&engine).await,
        Commands::Product { action } => match action {
            ProductAction::Create {
                category,
                name,
                price,
                description,
                brand,
                image,
            } => {
                commands::catalog::create(
                    &engine,
                    category,
                    &commands::catalog::input(name, &price, description, brand, image)?,
                )
                .await?;
            }
            ProductAction::Update {
                product_id,
                name,
                price,
                description,
                brand,
                image,
            } => {
                commands::catalog::update(
                    &engine,
                    product_id,
                    &commands::catalog::input(name, &price, description, brand, image)?,
                )
                .await?;
            }
            ProductAction::Delete { product_id } => {
                commands::catalog::delete(&engine, product_id).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&engine).await,
            CartAction::Add { product_id, quantity } => {
                commands::cart::add(&engine, product_id, quantity).await?;
            }
            CartAction::Set { product_id, quantity } => {
                commands::cart::set(&engine, product_id, quantity).await?;
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&engine, product_id).await?;
            }
            CartAction::Clear => commands::cart::clear(&engine).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&engine).await?,
            OrderAction::Place => commands::orders::place(&engine).await?,
            OrderAction::All => commands::orders::list_all(&engine).await?,
            OrderAction::SetStatus { order_id, status } => {
                commands::orders::set_status(&engine, order_id, &status).await?;
            }
        },
    }
    Ok(())
}
