//! Command implementations for the CLI

use crate::{config::Config, core::PackageStager};
use anyhow::Context;
use tracing::{info, instrument};

/// Stage, render and package according to the configuration
#[instrument(skip(config))]
pub fn execute_command(config: &Config) -> anyhow::Result<()> {
    info!(
        "Generating Debian package for target {} from {}",
        config.target,
        config.root_dir.display()
    );

    let stager = PackageStager::new(config.clone());
    let report = stager.run().context("Failed to generate Debian package")?;

    info!("{report}");
    if let Some(artifact) = &report.artifact {
        info!("Debian package written to {}", artifact.display());
    }

    Ok(())
}
