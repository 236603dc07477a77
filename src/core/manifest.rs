//! Copy manifest parsing
//!
//! A manifest holds one `SRC -> DEST` instruction per line. Paths may use
//! `|` in place of the platform path separator and may contain the
//! symbolic `ROOT_DIR` and `DEB_DIR` tokens.

use crate::error::{Result, StagerError};
use crate::utils::fs::FileSystemUtils;
use regex::{Captures, Regex};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use tracing::{debug, instrument};

/// Separator between the source and destination halves of a line
pub const ENTRY_SEPARATOR: &str = " -> ";
/// Placeholder standing in for the platform path separator
pub const PATH_SEPARATOR_TOKEN: &str = "|";
/// Token resolved to the project root
pub const ROOT_DIR_TOKEN: &str = "ROOT_DIR";
/// Token resolved to the staging output root
pub const DEB_DIR_TOKEN: &str = "DEB_DIR";

/// Resolves the symbolic tokens of a manifest path
#[derive(Debug, Clone)]
pub struct PathTokens {
    root_dir: String,
    deb_dir: String,
    re_token: Regex,
}

impl PathTokens {
    /// Create a resolver for the given project root and output root
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(root_dir: P, deb_dir: Q) -> Result<Self> {
        let pattern = [ROOT_DIR_TOKEN, DEB_DIR_TOKEN, PATH_SEPARATOR_TOKEN]
            .map(regex::escape)
            .join("|");
        Ok(Self {
            root_dir: root_dir.as_ref().to_string_lossy().into_owned(),
            deb_dir: deb_dir.as_ref().to_string_lossy().into_owned(),
            re_token: Regex::new(&pattern)
                .map_err(|e| StagerError::config(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Turn a manifest path into a filesystem path.
    ///
    /// Tokens are replaced wherever they occur in a single pass, so text
    /// coming from the resolved paths is never substituted again.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let resolved = self.re_token.replace_all(raw, |cap: &Captures<'_>| {
            match &cap[0] {
                ROOT_DIR_TOKEN => self.root_dir.clone(),
                DEB_DIR_TOKEN => self.deb_dir.clone(),
                _ => MAIN_SEPARATOR_STR.to_string(),
            }
        });
        PathBuf::from(resolved.into_owned())
    }
}

/// One resolved copy instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// 1-based manifest line the entry came from
    pub line: usize,
}

/// Ordered list of copy instructions
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub entries: Vec<CopyEntry>,
}

impl Manifest {
    /// Read and parse a manifest file
    #[instrument(skip(fs_utils, tokens))]
    pub fn load<P: AsRef<Path> + std::fmt::Debug>(
        fs_utils: &FileSystemUtils,
        path: P,
        tokens: &PathTokens,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = fs_utils
            .read_file_to_string(path)
            .map_err(|e| StagerError::file_system("read", path, e))?;

        Self::parse(&content, path, tokens)
    }

    /// Parse manifest text. Blank lines are skipped; `origin` is only
    /// used for error messages.
    ///
    /// Only the line as a whole is trimmed, so names with inner or
    /// trailing spaces survive.
    pub fn parse(content: &str, origin: &Path, tokens: &PathTokens) -> Result<Self> {
        let mut entries = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let mut halves = line.split(ENTRY_SEPARATOR);
            let (Some(src), Some(dest), None) = (halves.next(), halves.next(), halves.next())
            else {
                return Err(StagerError::malformed_entry(origin, index + 1, line));
            };

            if src.trim().is_empty() || dest.trim().is_empty() {
                return Err(StagerError::malformed_entry(origin, index + 1, line));
            }

            let entry = CopyEntry {
                source: tokens.resolve(src),
                destination: tokens.resolve(dest),
                line: index + 1,
            };
            debug!(
                "Manifest line {}: {} -> {}",
                entry.line,
                entry.source.display(),
                entry.destination.display()
            );
            entries.push(entry);
        }

        debug!("Parsed {} manifest entries", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn tokens() -> PathTokens {
        PathTokens::new("/proj", "/proj/bin/deb").unwrap()
    }

    #[test]
    fn test_resolve_tokens() {
        let tokens = tokens();
        assert_eq!(tokens.resolve("ROOT_DIR|bin|app"), PathBuf::from("/proj/bin/app"));
        assert_eq!(
            tokens.resolve("DEB_DIR|usr|bin|app"),
            PathBuf::from("/proj/bin/deb/usr/bin/app")
        );
        assert_eq!(tokens.resolve("relative|dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_resolve_slash_separated_paths() {
        let manifest = Manifest::parse(
            "ROOT_DIR/bin/app -> DEB_DIR/usr/bin/app",
            Path::new("m"),
            &tokens(),
        )
        .unwrap();

        assert_eq!(manifest.entries[0].source, PathBuf::from("/proj/bin/app"));
        assert_eq!(
            manifest.entries[0].destination,
            PathBuf::from("/proj/bin/deb/usr/bin/app")
        );
    }

    #[test]
    fn test_resolved_paths_are_not_substituted_again() {
        let tokens = PathTokens::new("/work/DEB_DIR", "/out").unwrap();
        assert_eq!(
            tokens.resolve("ROOT_DIR|app"),
            PathBuf::from("/work/DEB_DIR/app")
        );
    }

    #[test]
    fn test_names_keep_their_spaces() {
        let manifest = Manifest::parse(
            "ROOT_DIR|my file  -> DEB_DIR| spaced dir|f",
            Path::new("m"),
            &tokens(),
        )
        .unwrap();

        assert_eq!(manifest.entries[0].source, PathBuf::from("/proj/my file "));
        assert_eq!(
            manifest.entries[0].destination,
            PathBuf::from("/proj/bin/deb/ spaced dir/f")
        );
    }

    #[test]
    fn test_parse_manifest() {
        let content = "\
ROOT_DIR|bin|app -> DEB_DIR|usr|bin|app

   ROOT_DIR|stdlib -> DEB_DIR|usr|lib|evi
";
        let manifest = Manifest::parse(content, Path::new("copied-files.txt"), &tokens()).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.entries[0],
            CopyEntry {
                source: PathBuf::from("/proj/bin/app"),
                destination: PathBuf::from("/proj/bin/deb/usr/bin/app"),
                line: 1,
            }
        );
        assert_eq!(manifest.entries[1].source, PathBuf::from("/proj/stdlib"));
        assert_eq!(manifest.entries[1].destination, PathBuf::from("/proj/bin/deb/usr/lib/evi"));
        assert_eq!(manifest.entries[1].line, 3);
    }

    #[test]
    fn test_load_manifest() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "ROOT_DIR|a -> DEB_DIR|a\n").unwrap();

        let manifest = Manifest::load(&FileSystemUtils::new(), file.path(), &tokens()).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries[0].source, PathBuf::from("/proj/a"));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse("\n  \n", Path::new("m"), &tokens()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        let result = Manifest::parse(
            "ROOT_DIR|a -> DEB_DIR|a\nROOT_DIR|b DEB_DIR|b\n",
            Path::new("m"),
            &tokens(),
        );
        match result {
            Err(StagerError::MalformedEntry { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_separator_is_malformed() {
        let result = Manifest::parse("a -> b -> c", Path::new("m"), &tokens());
        assert!(matches!(result, Err(StagerError::MalformedEntry { line: 1, .. })));
    }

    #[test]
    fn test_empty_half_is_malformed() {
        // Trimming the line leaves "a ->", which has no separator at all
        let result = Manifest::parse("a -> ", Path::new("m"), &tokens());
        assert!(matches!(result, Err(StagerError::MalformedEntry { .. })));

        let result = Manifest::parse("x ->    -> y", Path::new("m"), &tokens());
        assert!(matches!(result, Err(StagerError::MalformedEntry { .. })));
    }
}
