//! GloKart CLI - Drive the marketplace from the terminal.
//!
//! State lives in JSON documents under `GLOKART_DATA_DIR`, and the signed-in
//! user persists between invocations just like a browser session.
//!
//! # Usage
//!
//! ```bash
//! # Reset storage to the demo catalog
//! glokart seed
//!
//! # Browse and sign in
//! glokart listings --category furniture
//! glokart login user@glokart.ae
//!
//! # Sell something, with fields suggested from the photo
//! glokart submit --image ./chair.jpg --autofill
//!
//! # Moderate
//! glokart admin-login admin admin123
//! glokart approve 3
//! ```
//!
//! # Environment Variables
//!
//! See `glokart_marketplace::config`. `RUST_LOG` sets the log filter
//! (default `info`) and `GLOKART_LOG_FORMAT=json` switches to JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glokart_core::{Category, ListingId, OfferAction, OfferId};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::listings::DraftArgs;

#[derive(Parser)]
#[command(name = "glokart")]
#[command(author, version, about = "GloKart marketplace CLI")]
struct Cli {
    /// Override `GLOKART_DATA_DIR`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace stored data with the demo catalog
    Seed,
    /// Browse listings
    Listings {
        /// Only this category
        #[arg(short, long)]
        category: Option<Category>,

        /// Search title, description and tags
        #[arg(short, long)]
        query: Option<String>,

        /// Which collection to show
        #[arg(long, value_enum, default_value = "marketplace")]
        view: commands::listings::View,
    },
    /// Submit a new listing for review as the signed-in user
    Submit {
        #[command(flatten)]
        draft: DraftArgs,

        /// Fill the fields from the first image before submitting
        #[arg(long)]
        autofill: bool,
    },
    /// Approve a pending listing (admin)
    Approve { id: ListingId },
    /// Reject a pending listing (admin)
    Reject {
        id: ListingId,

        /// Reason shown to the seller
        #[arg(short, long)]
        reason: String,
    },
    /// Edit a listing (seller or admin)
    Edit {
        id: ListingId,

        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete a listing (seller or admin)
    Delete { id: ListingId },
    /// Make an offer as the signed-in user
    Offer { id: ListingId, amount: Decimal },
    /// Accept or reject an offer on your listing
    Resolve {
        id: ListingId,
        offer: OfferId,

        /// `accept` or `reject`
        action: OfferAction,
    },
    /// Buy a listing as the signed-in user
    Buy { id: ListingId },
    /// Show the checkout breakdown for a listing
    Quote { id: ListingId },
    /// Revert lapsed reservations now
    Expire,
    /// Suggest listing fields for a photo
    Analyze {
        /// Path to the image
        image: PathBuf,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        address: String,

        #[arg(short, long)]
        phone: String,
    },
    /// Sign in by email
    Login { email: String },
    /// Sign in to the admin console
    AdminLogin { username: String, password: String },
    /// Sign out
    Logout,
    /// Save or unsave a listing
    Save { id: ListingId },
    /// Show the signed-in user's profile
    Profile,
    /// List every account (admin)
    Users,
}

fn init_tracing() {
    // Defaults to info level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "glokart_cli=info,glokart_marketplace=info".into());

    // JSON lines for log shipping, text otherwise
    let json = std::env::var("GLOKART_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before reading the log settings
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let reset = matches!(cli.command, Commands::Seed);
    let mut app = commands::App::open(cli.data_dir, reset)?;

    match cli.command {
        Commands::Seed => commands::listings::seed(&app),
        Commands::Listings {
            category,
            query,
            view,
        } => commands::listings::list(&app, category, query, view)?,
        Commands::Submit { draft, autofill } => {
            commands::listings::submit(&mut app, draft, autofill).await?;
        }
        Commands::Approve { id } => commands::listings::approve(&mut app, &id)?,
        Commands::Reject { id, reason } => commands::listings::reject(&mut app, &id, &reason)?,
        Commands::Edit { id, draft } => commands::listings::edit(&mut app, &id, draft)?,
        Commands::Delete { id } => commands::listings::delete(&mut app, &id)?,
        Commands::Offer { id, amount } => commands::listings::offer(&mut app, &id, amount)?,
        Commands::Resolve { id, offer, action } => {
            commands::listings::resolve(&mut app, &id, &offer, action)?;
        }
        Commands::Buy { id } => commands::listings::buy(&mut app, &id)?,
        Commands::Quote { id } => commands::listings::quote(&app, &id)?,
        Commands::Expire => commands::listings::expire(&mut app),
        Commands::Analyze { image } => commands::listings::analyze(&app, &image).await?,
        Commands::Register {
            name,
            email,
            address,
            phone,
        } => commands::account::register(&mut app, name, email, address, phone)?,
        Commands::Login { email } => commands::account::login(&mut app, &email)?,
        Commands::AdminLogin { username, password } => {
            commands::account::admin_login(&mut app, &username, &password)?;
        }
        Commands::Logout => commands::account::logout(&mut app),
        Commands::Save { id } => commands::account::save(&mut app, &id)?,
        Commands::Profile => commands::account::profile(&app)?,
        Commands::Users => commands::account::users(&app)?,
    }
    Ok(())
}
