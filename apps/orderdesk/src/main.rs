//! # OrderDesk CLI
//!
//! ## Startup Sequence
//! ```text
//! 1. Parse arguments (clap)
//! 2. Initialize logging (RUST_LOG, default info)
//! 3. Load configuration from ORDERDESK_* variables
//! 4. Run the command; database commands open the pool and apply migrations
//! 5. Print JSON (stdout) or the error (stderr, exit code 1)
//! ```

use clap::Parser;
use tracing::{debug, error};

use orderdesk::cli::{self, Cli, CliError};
use orderdesk::{init_tracing, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing();

    let config = AppConfig::load()?;
    debug!(
        path = %config.database_path.display(),
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    match cli::run(cli, &config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(CliError::Api(api_error)) => {
            error!(code = ?api_error.code, "{}", api_error.message);
            eprintln!("{}", serde_json::to_string_pretty(&api_error)?);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
