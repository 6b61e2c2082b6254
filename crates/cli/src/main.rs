//! Bazaar CLI - Database migrations and reference data.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar-cli migrate
//!
//! # Manage product categories
//! bazaar-cli category create -n "Kitchen"
//! bazaar-cli category list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `category create` / `category list` - Manage product categories

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage product categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Create a new category
    Create {
        /// Category name
        #[arg(short, long)]
        name: String,
    },
    /// List all categories
    List,
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
        Commands::Category { action } => match action {
            CategoryAction::Create { name } => {
                commands::category::create(&name).await?;
            }
            CategoryAction::List => {
                commands::category::list().await?;
            }
        },
    }
    Ok(())
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
    fn test_parses_category_create() {
        let cli = Cli::try_parse_from(["bazaar-cli", "category", "create", "--name", "Tools"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Category {
                action: CategoryAction::Create { .. }
            })
        ));
    }
}
