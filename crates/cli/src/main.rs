//! Store Ratings CLI - Database migrations and admin bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! store-ratings-cli migrate
//!
//! # Create the first admin account
//! store-ratings-cli admin create -e admin@example.com \
//!     -n "Platform Administrator" -a "1 Main Street" -p 'Str0ng!pw'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an admin account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "store-ratings-cli")]
#[command(author, version, about = "Store ratings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name (20-60 characters)
        #[arg(short, long)]
        name: String,

        /// Admin address
        #[arg(short, long, default_value = "")]
        address: String,

        /// Password; read from `RATINGS_ADMIN_PASSWORD` when omitted
        #[arg(short, long)]
        password: Option<String>,
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                address,
                password,
            } => {
                commands::admin::create_admin(&email, &name, &address, password).await?;
            }
        },
    }
    Ok(())
}
