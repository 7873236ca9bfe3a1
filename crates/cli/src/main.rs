//! Balloon Fiesta CLI - Account and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Hash a password for the predefined accounts file
//! bf-cli hash-password 'correct horse battery staple'
//!
//! # Same, reading the password from stdin
//! echo 'correct horse battery staple' | bf-cli hash-password
//!
//! # Check a catalog document before deploying it
//! bf-cli validate-catalog web.json
//! ```
//!
//! # Commands
//!
//! - `hash-password` - Print an argon2 hash for `BF_ACCOUNTS_FILE`
//! - `validate-catalog` - Report product and category counts and missing prices

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bf-cli")]
#[command(author, version, about = "Balloon Fiesta CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password for the predefined accounts file
    HashPassword {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,
    },
    /// Check a `web.json` catalog document
    ValidateCatalog {
        /// Path to the document
        path: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::HashPassword { password } => commands::password::hash(password)?,
        Commands::ValidateCatalog { path } => commands::catalog::validate(&path)?,
    }
    Ok(())
}
