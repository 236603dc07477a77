//! Command-line argument parsing and validation

use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

/// Debian package stager - copies files into a package tree, renders the
/// control file and builds the .deb
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "generate-deb")]
pub struct Args {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Project root, substituted for ROOT_DIR in the manifest
    #[arg(long = "root-dir", default_value = ".")]
    pub root_dir: PathBuf,

    /// Staging output root, substituted for DEB_DIR [default: <root>/bin/deb]
    #[arg(long = "deb-dir")]
    pub deb_dir: Option<PathBuf>,

    /// Copy manifest [default: <root>/tools/debian-package/copied-files.txt]
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Control file template [default: <root>/tools/debian-package/control]
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Header with name/version/contact declarations [default: <root>/include/common.hpp]
    #[arg(long)]
    pub declarations: Option<PathBuf>,

    /// Packaging tool invoked with the staged tree and archive path
    #[arg(long, default_value = "dpkg-deb")]
    pub packager: String,

    /// Stop after rendering the control file
    #[arg(long = "skip-package")]
    pub skip_package: bool,

    /// Build target, used as the package architecture
    pub target: String,

    /// Directory the .deb is written to
    pub output_dir: PathBuf,
}

/// Parse command line arguments.
///
/// Usage errors exit with status 1 rather than clap's default of 2.
pub fn parse_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        let code = match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        // Printing can only fail if stdout/stderr are gone
        let _ = e.print();
        std::process::exit(code);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positionals() {
        let args = Args::try_parse_from(["generate-deb", "amd64", "dist"]).unwrap();
        assert!(!args.debug);
        assert_eq!(args.target, "amd64");
        assert_eq!(args.output_dir, PathBuf::from("dist"));
        assert_eq!(args.root_dir, PathBuf::from("."));
        assert_eq!(args.packager, "dpkg-deb");
        assert!(args.manifest.is_none());
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "generate-deb",
            "--debug",
            "--root-dir",
            "/proj",
            "--packager",
            "true",
            "--skip-package",
            "arm64",
            "out",
        ])
        .unwrap();
        assert!(args.debug);
        assert!(args.skip_package);
        assert_eq!(args.root_dir, PathBuf::from("/proj"));
        assert_eq!(args.packager, "true");
        assert_eq!(args.target, "arm64");
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        assert!(Args::try_parse_from(["generate-deb", "amd64"]).is_err());
        assert!(Args::try_parse_from(["generate-deb", "amd64", "out", "extra"]).is_err());
    }
}
