//! Copperpot CLI - command-line storefront front-end.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! copperpot browse
//! copperpot product 7
//!
//! # Manage the cart
//! copperpot cart add 7
//! copperpot cart show
//! copperpot checkout
//!
//! # Session
//! copperpot login -e sam@example.com -p hunter22
//! copperpot logout
//!
//! # Admin console
//! copperpot admin create-product -n "Headphones" -p 129.99
//! copperpot admin upload products.csv
//! ```
//!
//! Every command is a "view": before a view renders, the access gate
//! checks the current session against the view's policy and the CLI
//! follows the resulting redirect (login prompt or landing page) the way
//! a browser front-end would.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use copperpot_core::Price;

use copperpot_client::config::ClientConfig;
use copperpot_client::gate::{self, AccessPolicy, GateDecision};
use copperpot_client::storage::MemoryStorage;
use copperpot_client::{AppState, Result};

mod commands;

use commands::{admin, auth, cart, catalog};

#[derive(Parser)]
#[command(name = "copperpot")]
#[command(author, version, about = "Copperpot storefront CLI")]
struct Cli {
    /// Keep session and cart in memory only (no storage document).
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Browse,
    /// Show one product
    Product {
        /// Product ID
        id: i32,
    },
    /// List catalog categories
    Categories,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout,
    /// Show past orders
    Orders,
    /// Create an account (logs you in)
    Register {
        #[arg(short, long)]
        firstname: String,
        #[arg(short, long)]
        lastname: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the current session
    Whoami,
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: i32,
    },
    /// Increment a line's quantity
    Inc {
        /// Product ID
        id: i32,
    },
    /// Decrement a line's quantity (never below 1)
    Dec {
        /// Product ID
        id: i32,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: i32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a catalog product
    CreateProduct {
        #[arg(short, long)]
        name: String,
        /// Unit price, e.g. 129.99
        #[arg(short, long, value_parser = parse_price)]
        price: Price,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image_url: Option<String>,
        #[arg(short, long)]
        category_id: Option<i32>,
    },
    /// Update a catalog product
    UpdateProduct {
        /// Product ID
        id: i32,
        #[arg(short, long)]
        name: String,
        /// Unit price, e.g. 129.99
        #[arg(short, long, value_parser = parse_price)]
        price: Price,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image_url: Option<String>,
        #[arg(short, long)]
        category_id: Option<i32>,
    },
    /// Bulk-upload products from a CSV file
    Upload {
        /// Path to the CSV file
        file: std::path::PathBuf,
    },
}

/// clap value parser for price arguments.
fn parse_price(raw: &str) -> std::result::Result<Price, String> {
    let amount: rust_decimal::Decimal = raw
        .parse()
        .map_err(|_| format!("not a decimal amount: {raw}"))?;
    Price::new(amount).map_err(|e| e.to_string())
}

impl Commands {
    /// The access policy of the view this command renders.
    const fn policy(&self) -> AccessPolicy {
        match self {
            Self::Register { .. } | Self::Login { .. } | Self::Logout | Self::Whoami => {
                AccessPolicy::Public
            }
            Self::Browse
            | Self::Product { .. }
            | Self::Categories
            | Self::Cart { .. }
            | Self::Checkout
            | Self::Orders => AccessPolicy::RequireAuth,
            Self::Admin { .. } => AccessPolicy::RequireAdmin,
        }
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let state = if cli.ephemeral {
        AppState::with_storage(config, Arc::new(MemoryStorage::new()))?
    } else {
        AppState::new(config)?
    };

    // The gate runs before any view renders; a denied navigation is a
    // redirect, not an error.
    match gate::evaluate(state.sessions(), cli.command.policy()) {
        GateDecision::Allow => {}
        GateDecision::RedirectToLogin => {
            println!("Please log in first: copperpot login -e <email> -p <password>");
            return Ok(());
        }
        GateDecision::RedirectToLanding => {
            println!("That view needs an admin account. Taking you back to the shop:");
            println!();
            return catalog::browse(&state).await;
        }
    }

    match cli.command {
        Commands::Browse => catalog::browse(&state).await,
        Commands::Product { id } => catalog::product(&state, id).await,
        Commands::Categories => catalog::categories(&state).await,
        Commands::Cart { action } => match action {
            CartAction::Show => cart::show(&state),
            CartAction::Add { id } => cart::add(&state, id).await,
            CartAction::Inc { id } => cart::adjust(&state, id, 1),
            CartAction::Dec { id } => cart::adjust(&state, id, -1),
            CartAction::Remove { id } => cart::remove(&state, id),
            CartAction::Clear => cart::clear(&state),
        },
        Commands::Checkout => cart::checkout(&state).await,
        Commands::Orders => catalog::orders(&state).await,
        Commands::Register {
            firstname,
            lastname,
            email,
            password,
        } => auth::register(&state, firstname, lastname, email, password).await,
        Commands::Login { email, password } => auth::login(&state, email, password).await,
        Commands::Logout => auth::logout(&state),
        Commands::Whoami => auth::whoami(&state),
        Commands::Admin { action } => match action {
            AdminAction::CreateProduct {
                name,
                price,
                description,
                image_url,
                category_id,
            } => admin::create_product(&state, name, price, description, image_url, category_id).await,
            AdminAction::UpdateProduct {
                id,
                name,
                price,
                description,
                image_url,
                category_id,
            } => {
                admin::update_product(&state, id, name, price, description, image_url, category_id)
                    .await
            }
            AdminAction::Upload { file } => admin::upload(&state, &file).await,
        },
    }
}
