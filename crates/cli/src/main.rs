//! Savat CLI - browse the catalog, manage a cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! savat products list --limit 5 --sort desc
//! savat products show 3
//!
//! # Cart (kept between runs)
//! savat cart add 3 -q 2
//! savat cart show
//!
//! # Orders
//! savat login -e customer@example.com -p secret1
//! savat checkout
//! savat orders mine
//! ```
//!
//! Configuration comes from `SAVAT_*` environment variables (see
//! `savat_storefront::config`). Results go to stdout, logs to stderr; set
//! `RUST_LOG` to change verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savat_core::{OrderId, ProductId};
use savat_storefront::Storefront;
use savat_storefront::api::SortOrder;
use savat_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "savat")]
#[command(author, version, about = "Savat storefront from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// Place an order for the cart contents
    Checkout,
    /// View orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Store-wide figures (administrators only)
    Dashboard,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,

        /// Sort by ID (`asc` or `desc`)
        #[arg(short, long)]
        sort: Option<SortOrder>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Set {
        /// Product ID
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Orders placed by the signed-in user
    Mine,
    /// Every order (administrators only)
    All,
    /// One order
    Show {
        /// Order ID
        id: OrderId,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "savat_storefront=info,savat_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!(error = %e, "Command failed");
        tracing::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> savat_storefront::Result<()> {
    let config = StorefrontConfig::from_env()?;
    let mut shop = Storefront::init(config)?;

    let result = dispatch(&mut shop, cli.command).await;
    shop.dispose();
    result
}

async fn dispatch(shop: &mut Storefront, command: Commands) -> savat_storefront::Result<()> {
    match command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                limit,
                sort,
                category,
            } => commands::products::list(shop, limit, sort, category.as_deref()).await,
            ProductsAction::Show { id } => commands::products::show(shop, id).await,
            ProductsAction::Categories => commands::products::categories(shop).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => {
                commands::cart::show(shop);
                Ok(())
            }
            CartAction::Add { id, quantity } => commands::cart::add(shop, id, quantity).await,
            CartAction::Set { id, quantity } => commands::cart::set(shop, id, quantity),
            CartAction::Remove { id } => {
                commands::cart::remove(shop, id);
                Ok(())
            }
            CartAction::Clear => {
                commands::cart::clear(shop);
                Ok(())
            }
        },
        Commands::Login { email, password } => {
            commands::account::login(shop, &email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(shop, &name, &email, password).await,
        Commands::Logout => {
            commands::account::logout(shop);
            Ok(())
        }
        Commands::Whoami => {
            commands::account::whoami(shop);
            Ok(())
        }
        Commands::Checkout => commands::orders::checkout(shop).await,
        Commands::Orders { action } => match action {
            OrdersAction::Mine => commands::orders::mine(shop).await,
            OrdersAction::All => commands::orders::all(shop).await,
            OrdersAction::Show { id } => commands::orders::show(shop, id).await,
        },
        Commands::Dashboard => commands::orders::dashboard(shop).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_set_negative() {
        let cli = Cli::try_parse_from(["savat", "cart", "set", "4", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            })
        ));
    }

    #[test]
    fn test_parse_products_list() {
        let cli = Cli::try_parse_from(["savat", "products", "list", "-l", "3", "-s", "desc"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Products {
                action: ProductsAction::List {
                    limit: Some(3),
                    sort: Some(SortOrder::Desc),
                    category: None,
                }
            })
        ));
        assert!(Cli::try_parse_from(["savat", "products", "list", "-s", "up"]).is_err());
    }
}
