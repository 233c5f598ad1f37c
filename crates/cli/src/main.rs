//! Packon CLI - terminal storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Show a product and click through its options
//! packon product sacos-stand-up --select Espessura=Grossa --select Cor=Kraft
//!
//! # Add the selected variant to the cart
//! packon product sacos-stand-up --select Espessura=Grossa --increase 2 --add
//!
//! # Inspect and edit the cart
//! packon cart show
//! packon cart update gid://shopify/CartLine/1 300
//! packon cart remove gid://shopify/CartLine/1
//! packon cart checkout
//!
//! # Browse the catalog
//! packon collections
//! packon collection sacos
//!
//! # Shipping estimate
//! packon shipping 01310-100
//! ```
//!
//! # Environment Variables
//!
//! See `packon_storefront::config` for the full list. `RUST_LOG` overrides the
//! default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use packon_storefront::{AppError, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;
mod display;

use commands::product::ProductArgs;
use context::Context;

#[derive(Parser)]
#[command(name = "packon")]
#[command(author, version, about = "Packon storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a product, apply option clicks, optionally add to cart
    Product(ProductArgs),
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List collections
    Collections {
        /// How many collections to list
        #[arg(long, default_value_t = 20)]
        first: i64,
    },
    /// List the products in a collection
    Collection {
        /// Collection handle
        handle: String,

        /// How many products to list
        #[arg(long, default_value_t = 24)]
        first: i64,
    },
    /// Estimate shipping for a CEP
    Shipping {
        /// Postal code (12345-678 or 12345678)
        cep: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a variant to the cart
    Add {
        /// Variant id
        variant_id: String,

        /// Quantity (positive)
        quantity: u32,
    },
    /// Set a line's quantity (0 removes the line)
    Update {
        /// Cart line id
        line_id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove lines from the cart
    Remove {
        /// Cart line ids
        #[arg(required = true)]
        line_ids: Vec<String>,
    },
    /// Show the cart drawer
    Open,
    /// Print the checkout URL
    Checkout,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "packon_storefront=info,packon_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::print_stdout, clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match Context::new(config) {
        Ok(ctx) => run(cli, &ctx).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.report());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, ctx: &Context) -> Result<String, AppError> {
    match cli.command {
        Commands::Product(args) => commands::product::show(ctx, args).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx).await,
            CartAction::Add {
                variant_id,
                quantity,
            } => commands::cart::add(ctx, variant_id, quantity).await,
            CartAction::Update { line_id, quantity } => {
                commands::cart::update(ctx, line_id, quantity).await
            }
            CartAction::Remove { line_ids } => commands::cart::remove(ctx, line_ids).await,
            CartAction::Open => commands::cart::open(ctx).await,
            CartAction::Checkout => commands::cart::checkout(ctx).await,
        },
        Commands::Collections { first } => commands::catalog::collections(ctx, first).await,
        Commands::Collection { handle, first } => {
            commands::catalog::collection(ctx, &handle, first).await
        }
        Commands::Shipping { cep } => commands::shipping::estimate(ctx, &cep).await,
    }
}
