//! Aabhushan CLI - user management and webhook testing tools.
//!
//! # Usage
//!
//! ```bash
//! # List the newest user documents
//! aabhushan-cli users list --limit 20
//!
//! # Show one user by identity provider id
//! aabhushan-cli users show user_2abc
//!
//! # Promote a user to admin
//! aabhushan-cli users set-role user_2abc admin
//!
//! # Deactivate a user
//! aabhushan-cli users deactivate user_2abc
//!
//! # Sign a webhook payload for a local test delivery
//! aabhushan-cli webhook sign --payload user_created.json
//! ```
//!
//! # Commands
//!
//! - `users` - Read and modify user documents in Appwrite
//! - `webhook sign` - Produce Svix headers for a payload file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aabhushan-cli")]
#[command(author, version, about = "Aabhushan CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user documents
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Webhook testing helpers
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List user documents, newest first
    List {
        /// Number of documents to fetch
        #[arg(short, long, default_value_t = 25)]
        limit: u32,

        /// Number of documents to skip
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one user
    Show {
        /// Identity provider user id (e.g. `user_2abc`)
        provider_id: String,
    },
    /// Change a user's role
    SetRole {
        /// Identity provider user id
        provider_id: String,

        /// New role (`customer` or `admin`)
        role: String,
    },
    /// Mark a user inactive
    Deactivate {
        /// Identity provider user id
        provider_id: String,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Sign a JSON payload with `CLERK_WEBHOOK_SECRET`
    Sign {
        /// File containing the exact request body
        #[arg(short, long)]
        payload: PathBuf,

        /// Message id (`svix-id`); generated when omitted
        #[arg(long)]
        msg_id: Option<String>,

        /// Unix timestamp (`svix-timestamp`); now when omitted
        #[arg(long)]
        timestamp: Option<i64>,
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
        Commands::Users { action } => match action {
            UsersAction::List { limit, offset } => commands::users::list(limit, offset).await?,
            UsersAction::Show { provider_id } => commands::users::show(&provider_id).await?,
            UsersAction::SetRole { provider_id, role } => {
                commands::users::set_role(&provider_id, &role).await?;
            }
            UsersAction::Deactivate { provider_id } => {
                commands::users::deactivate(&provider_id).await?;
            }
        },
        Commands::Webhook { action } => match action {
            WebhookAction::Sign {
                payload,
                msg_id,
                timestamp,
            } => commands::webhook::sign(&payload, msg_id, timestamp).await?,
        },
    }
    Ok(())
}
