//! Lunette CLI - support tools for the storefront list state.
//!
//! # Usage
//!
//! ```bash
//! # Decode a list cookie copied from browser dev tools
//! lunette-cli cookie decode --kind compare '%5B%22prod_1%22%5D'
//!
//! # Mint or inspect a guest id
//! lunette-cli guest-id
//! lunette-cli guest-id --parse guest_1718000000000_k3j9x0a1b
//!
//! # Inspect or change a shopper's liked products on the backend
//! lunette-cli liked list cus_01HZX
//! lunette-cli liked add cus_01HZX prod_01J
//! ```
//!
//! # Commands
//!
//! - `cookie decode` - Decode a compare or recently viewed cookie
//! - `guest-id` - Generate or validate guest ids
//! - `liked` - List, add or remove liked products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::cookie::CookieKind;

#[derive(Parser)]
#[command(name = "lunette-cli")]
#[command(author, version, about = "Lunette storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect list cookies
    Cookie {
        #[command(subcommand)]
        action: CookieAction,
    },
    /// Generate a guest id, or validate one with --parse
    GuestId {
        /// Existing guest id to validate
        #[arg(long)]
        parse: Option<String>,
    },
    /// Manage liked products on the commerce backend
    Liked {
        #[command(subcommand)]
        action: LikedAction,
    },
}

#[derive(Subcommand)]
enum CookieAction {
    /// Decode a percent-encoded list cookie value
    Decode {
        /// Which list the value belongs to
        #[arg(short, long, value_enum)]
        kind: CookieKind,

        /// Capacity to apply (defaults to the storefront default)
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Raw cookie value
        value: String,
    },
}

#[derive(Subcommand)]
enum LikedAction {
    /// List liked product ids
    List {
        /// Customer or guest id
        owner: String,
    },
    /// Like a product
    Add {
        /// Customer or guest id
        owner: String,
        /// Product id
        product_id: String,
    },
    /// Unlike a product
    Remove {
        /// Customer or guest id
        owner: String,
        /// Product id
        product_id: String,
    },
}

/// Command results are reported as `info` events, so they must pass by default.
const DEFAULT_LOG_FILTER: &str = "info";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .finish()
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    subscriber(log_filter(), std::io::stdout).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cookie { action } => match action {
            CookieAction::Decode {
                kind,
                capacity,
                value,
            } => commands::cookie::decode(kind, &value, capacity)?,
        },
        Commands::GuestId { parse } => match parse {
            Some(raw) => commands::guest::inspect(&raw)?,
            None => commands::guest::mint()?,
        },
        Commands::Liked { action } => match action {
            LikedAction::List { owner } => commands::liked::list(&owner).await?,
            LikedAction::Add { owner, product_id } => {
                commands::liked::add(&owner, &product_id).await?;
            }
            LikedAction::Remove { owner, product_id } => {
                commands::liked::remove(&owner, &product_id).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn output_of(command: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = subscriber(EnvFilter::new(DEFAULT_LOG_FILTER), move || writer.clone());
        tracing::subscriber::with_default(subscriber, command);
        captured.text()
    }

    #[test]
    fn test_default_filter_shows_guest_id() {
        let output = output_of(|| commands::guest::mint().unwrap());
        assert!(output.contains("Generated guest id"), "{output}");
    }

    #[test]
    fn test_default_filter_shows_decoded_cookie() {
        let output = output_of(|| {
            commands::cookie::decode(CookieKind::Compare, "%5B%22prod_1%22%5D", None).unwrap();
        });
        assert!(output.contains("Decoded list cookie"), "{output}");
    }

    #[test]
    fn test_default_filter_hides_debug() {
        let output = output_of(|| tracing::debug!("cache detail"));
        assert!(output.is_empty(), "{output}");
    }
}
