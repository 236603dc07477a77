//! # Debian Package Stager
//!
//! Assembles a Debian package tree from a manifest of copy instructions,
//! renders its control file from a template filled with values declared in
//! the project's header file, and builds the archive with `dpkg-deb`.
//!
//! ## Example
//!
//! ```no_run
//! use deb_stager::{config::Config, core::PackageStager};
//!
//! let config = Config {
//!     target: "amd64".to_string(),
//!     ..Config::default()
//! };
//! let report = PackageStager::new(config).run()?;
//! println!("{report}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
