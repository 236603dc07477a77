//! Control file template rendering

use crate::core::metadata::{MetadataKey, MetadataRecord};
use crate::error::{Result, StagerError};
use crate::utils::fs::FileSystemUtils;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A control file template with `{{key}}` placeholders
#[derive(Debug, Clone)]
pub struct ControlTemplate {
    path: PathBuf,
    text: String,
    /// Regex for any `{{...}}` token on a single line
    re_placeholder: Regex,
}

impl ControlTemplate {
    /// Load a template from disk
    #[instrument(skip(fs_utils))]
    pub fn load<P: AsRef<Path> + std::fmt::Debug>(fs_utils: &FileSystemUtils, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs_utils
            .read_file_to_string(path)
            .map_err(|e| StagerError::file_system("read", path, e))?;
        Self::new(path, text)
    }

    pub fn new<P: Into<PathBuf>>(path: P, text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            text: text.into(),
            re_placeholder: Regex::new(r"\{\{([^{}\n]*)\}\}")
                .map_err(|e| StagerError::config(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Substitute every placeholder with its metadata value.
    ///
    /// The template is checked for unknown tokens before anything is
    /// replaced; substituted values are copied verbatim and never scanned.
    pub fn render(&self, record: &MetadataRecord) -> Result<String> {
        if let Some(unknown) = self
            .re_placeholder
            .captures_iter(&self.text)
            .find(|cap| MetadataKey::from_name(&cap[1]).is_none())
        {
            return Err(StagerError::unknown_placeholder(&unknown[0], &self.path));
        }

        let rendered = self
            .re_placeholder
            .replace_all(&self.text, |cap: &Captures<'_>| {
                // Every token was checked above
                MetadataKey::from_name(&cap[1])
                    .map_or_else(|| cap[0].to_string(), |key| record.get(key).to_string())
            });
        debug!("Rendered control template {}", self.path.display());

        Ok(rendered.into_owned())
    }
}
