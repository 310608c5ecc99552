//! # OrderDesk Application Library
//!
//! Services, configuration and CLI for OrderDesk.
//!
//! ## Module Organization
//! ```text
//! orderdesk/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── config.rs       ◄─── Environment configuration
//! ├── error.rs        ◄─── ApiError returned by services
//! ├── cli.rs          ◄─── `orderdesk` subcommands
//! └── services/
//!     ├── customer.rs ◄─── CustomerService + CustomerDto
//!     └── order.rs    ◄─── OrderService + OrderDto, quoting
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod services;

use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::{CustomerDto, CustomerService, OrderDto, OrderService};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages, including pricing audit events
/// - `RUST_LOG=orderdesk_core=debug` - Pricing only
/// - Default: INFO, sqlx quieted to WARN
///
/// Logs go to stderr so command output on stdout stays valid JSON.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
