//! Configuration management for the package stager
//!
//! Built once from the command line and passed down explicitly; all
//! project-relative defaults are resolved against the root directory here.

use crate::{cli::Args, error::StagerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Build target, used as the package architecture
    pub target: String,
    /// Project root, substituted for `ROOT_DIR`
    pub root_dir: PathBuf,
    /// Directory the final `.deb` is written to
    pub output_dir: PathBuf,
    /// Staging configuration
    pub staging: StagingConfig,
    /// Packaging tool configuration
    pub packaging: PackagingConfig,
}

/// Where staging inputs and outputs live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Output root of the staged tree, substituted for `DEB_DIR`
    pub deb_dir: PathBuf,
    /// Copy manifest
    pub manifest_path: PathBuf,
    /// Control file template
    pub template_path: PathBuf,
    /// Header file holding the name/version/contact declarations
    pub declarations_path: PathBuf,
}

/// External packaging tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// Whether to build the archive at all
    pub enabled: bool,
    /// Program to run
    pub tool: String,
    /// Arguments placed before the staged root and artifact path
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            target: String::new(),
            root_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            staging: StagingConfig::default(),
            packaging: PackagingConfig::default(),
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self::for_root(Path::new("."))
    }
}

impl StagingConfig {
    /// Default project layout under `root`
    pub fn for_root(root: &Path) -> Self {
        let tools = root.join("tools").join("debian-package");
        Self {
            deb_dir: root.join("bin").join("deb"),
            manifest_path: tools.join("copied-files.txt"),
            template_path: tools.join("control"),
            declarations_path: root.join("include").join("common.hpp"),
        }
    }

    /// Directory holding the package metadata inside the staged tree
    pub fn metadata_dir(&self) -> PathBuf {
        self.deb_dir.join("DEBIAN")
    }

    /// Path of the rendered control file
    pub fn control_path(&self) -> PathBuf {
        self.metadata_dir().join("control")
    }
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tool: "dpkg-deb".to_string(),
            args: vec!["--build".to_string()],
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, StagerError> {
        let root_dir = args.root_dir.canonicalize().map_err(|e| {
            StagerError::validation(format!(
                "Root directory not found: {} ({e})",
                args.root_dir.display()
            ))
        })?;

        let mut staging = StagingConfig::for_root(&root_dir);
        if let Some(deb_dir) = &args.deb_dir {
            staging.deb_dir = deb_dir.clone();
        }
        if let Some(manifest) = &args.manifest {
            staging.manifest_path = manifest.clone();
        }
        if let Some(template) = &args.template {
            staging.template_path = template.clone();
        }
        if let Some(declarations) = &args.declarations {
            staging.declarations_path = declarations.clone();
        }

        let config = Self {
            debug: args.debug,
            target: args.target.trim().to_string(),
            root_dir,
            output_dir: args.output_dir.clone(),
            staging,
            packaging: PackagingConfig {
                enabled: !args.skip_package,
                tool: args.packager.clone(),
                ..PackagingConfig::default()
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), StagerError> {
        if self.target.is_empty() {
            return Err(StagerError::validation("Target must not be empty"));
        }

        if !self.root_dir.is_dir() {
            return Err(StagerError::validation(format!(
                "Root directory not found: {}",
                self.root_dir.display()
            )));
        }

        if !self.staging.manifest_path.is_file() {
            return Err(StagerError::validation(format!(
                "Manifest file not found: {}",
                self.staging.manifest_path.display()
            )));
        }

        if !self.staging.template_path.is_file() {
            return Err(StagerError::validation(format!(
                "Control template not found: {}",
                self.staging.template_path.display()
            )));
        }

        if self.packaging.enabled && self.packaging.tool.trim().is_empty() {
            return Err(StagerError::config("Packaging tool must not be empty"));
        }

        Ok(())
    }

    /// Path of the archive for a given file name
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let tools = temp_dir.path().join("tools").join("debian-package");
        fs::create_dir_all(&tools).unwrap();
        fs::write(tools.join("copied-files.txt"), "").unwrap();
        fs::write(tools.join("control"), "Package: {{package-name}}\n").unwrap();
        temp_dir
    }

    #[test]
    fn test_defaults_resolve_against_root() {
        let temp_dir = project();
        let root = temp_dir.path().to_str().unwrap();
        let args = Args::try_parse_from(["generate-deb", "--root-dir", root, "amd64", "out"]).unwrap();

        let config = Config::from_args(&args).unwrap();
        let root_dir = temp_dir.path().canonicalize().unwrap();

        assert_eq!(config.target, "amd64");
        assert_eq!(config.root_dir, root_dir);
        assert_eq!(config.staging.deb_dir, root_dir.join("bin").join("deb"));
        assert_eq!(
            config.staging.declarations_path,
            root_dir.join("include").join("common.hpp")
        );
        assert_eq!(
            config.staging.control_path(),
            root_dir.join("bin").join("deb").join("DEBIAN").join("control")
        );
        assert_eq!(config.packaging.tool, "dpkg-deb");
        assert!(config.packaging.enabled);
    }

    #[test]
    fn test_missing_manifest_fails_validation() {
        let temp_dir = project();
        fs::remove_file(
            temp_dir
                .path()
                .join("tools")
                .join("debian-package")
                .join("copied-files.txt"),
        )
        .unwrap();

        let root = temp_dir.path().to_str().unwrap();
        let args = Args::try_parse_from(["generate-deb", "--root-dir", root, "amd64", "out"]).unwrap();
        assert!(matches!(
            Config::from_args(&args),
            Err(StagerError::Validation { .. })
        ));
    }

    #[test]
    fn test_blank_target_fails_validation() {
        let temp_dir = project();
        let root = temp_dir.path().to_str().unwrap();
        let args = Args::try_parse_from(["generate-deb", "--root-dir", root, " ", "out"]).unwrap();
        assert!(Config::from_args(&args).is_err());
    }
}
