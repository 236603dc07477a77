//! Package metadata extraction
//!
//! Reads `#define <MARKER> "<value>"` declarations out of the project's
//! header file without preprocessing or compiling it.

use crate::error::{Result, StagerError};
use crate::utils::fs::FileSystemUtils;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// The fixed set of keys a control template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataKey {
    PackageName,
    Version,
    Architecture,
    Email,
    Website,
}

impl MetadataKey {
    /// All keys, in control-file order
    pub const ALL: [MetadataKey; 5] = [
        MetadataKey::PackageName,
        MetadataKey::Version,
        MetadataKey::Architecture,
        MetadataKey::Email,
        MetadataKey::Website,
    ];

    /// Key name as written inside a placeholder
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::PackageName => "package-name",
            MetadataKey::Version => "version",
            MetadataKey::Architecture => "architecture",
            MetadataKey::Email => "email",
            MetadataKey::Website => "website",
        }
    }

    /// Key for a placeholder name, if it is one of the known keys
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// The `{{key}}` token replaced in the control template
    pub fn placeholder(self) -> String {
        format!("{{{{{}}}}}", self.as_str())
    }

    /// Declaration marker the value is read from, or `None` for
    /// values supplied by the caller
    pub fn marker(self) -> Option<&'static str> {
        match self {
            MetadataKey::PackageName => Some("APP_NAME"),
            MetadataKey::Version => Some("APP_VERSION"),
            MetadataKey::Architecture => None,
            MetadataKey::Email => Some("EMAIL"),
            MetadataKey::Website => Some("LINK"),
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved metadata for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub package_name: String,
    pub version: String,
    pub architecture: String,
    pub email: String,
    pub website: String,
}

impl MetadataRecord {
    /// Look up the value for a key
    pub fn get(&self, key: MetadataKey) -> &str {
        match key {
            MetadataKey::PackageName => &self.package_name,
            MetadataKey::Version => &self.version,
            MetadataKey::Architecture => &self.architecture,
            MetadataKey::Email => &self.email,
            MetadataKey::Website => &self.website,
        }
    }

    /// File name of the archive, `<name>_<version>_<arch>.deb`
    pub fn artifact_file_name(&self) -> String {
        format!(
            "{}_{}_{}.deb",
            self.package_name, self.version, self.architecture
        )
    }
}

/// Parser for `#define <MARKER> "<value>"` declarations
#[derive(Debug, Clone)]
pub struct DeclarationParser {
    /// Regex for a single-line define with a non-empty string value
    re_define: Regex,
}

impl DeclarationParser {
    /// Create a new declaration parser
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_define: Regex::new(r#"(?m)#define[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]+"([^"\n]+)""#)
                .map_err(|e| StagerError::config(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Extract the first non-empty value declared for `marker`.
    ///
    /// The marker matches as a whole identifier only.
    pub fn extract_declared_value(&self, text: &str, marker: &str) -> Option<String> {
        self.re_define
            .captures_iter(text)
            .find(|cap| &cap[1] == marker)
            .map(|cap| cap[2].to_string())
    }
}

/// Reads metadata values from a declarations file
#[derive(Debug)]
pub struct MetadataExtractor {
    path: PathBuf,
    contents: String,
    architecture: String,
    parser: DeclarationParser,
}

impl MetadataExtractor {
    /// Load the declarations file. `architecture` is the build target
    /// identifier and is not read from the file.
    #[instrument(skip(fs_utils))]
    pub fn load<P: AsRef<Path> + fmt::Debug>(
        fs_utils: &FileSystemUtils,
        path: P,
        architecture: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs_utils
            .read_file_to_string(path)
            .map_err(|e| StagerError::file_system("read", path, e))?;

        Self::from_contents(path, contents, architecture)
    }

    /// Build an extractor over already-loaded declarations
    pub fn from_contents<P: Into<PathBuf>>(
        path: P,
        contents: impl Into<String>,
        architecture: &str,
    ) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            contents: contents.into(),
            architecture: architecture.trim().to_string(),
            parser: DeclarationParser::new()?,
        })
    }

    /// Value for a single key
    pub fn value(&self, key: MetadataKey) -> Result<String> {
        let Some(marker) = key.marker() else {
            if self.architecture.is_empty() {
                return Err(StagerError::missing_metadata("target architecture", &self.path));
            }
            return Ok(self.architecture.clone());
        };

        let value = self
            .parser
            .extract_declared_value(&self.contents, marker)
            .ok_or_else(|| StagerError::missing_metadata(marker, &self.path))?;
        debug!("Extracted {} = '{}'", marker, value);
        Ok(value)
    }

    pub fn package_name(&self) -> Result<String> {
        self.value(MetadataKey::PackageName)
    }

    pub fn version(&self) -> Result<String> {
        self.value(MetadataKey::Version)
    }

    pub fn architecture(&self) -> Result<String> {
        self.value(MetadataKey::Architecture)
    }

    pub fn email(&self) -> Result<String> {
        self.value(MetadataKey::Email)
    }

    pub fn website(&self) -> Result<String> {
        self.value(MetadataKey::Website)
    }

    /// Resolve every key, failing on the first one that is missing
    #[instrument(skip(self))]
    pub fn record(&self) -> Result<MetadataRecord> {
        Ok(MetadataRecord {
            package_name: self.package_name()?,
            version: self.version()?,
            architecture: self.architecture()?,
            email: self.email()?,
            website: self.website()?,
        })
    }
}
