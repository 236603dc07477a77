//! Core staging functionality
//!
//! Metadata extraction, manifest parsing, control rendering and the
//! staging run that ties them together.

pub mod control;
pub mod manifest;
pub mod metadata;
pub mod stager;

pub use control::ControlTemplate;
pub use manifest::{CopyEntry, Manifest, PathTokens};
pub use metadata::{DeclarationParser, MetadataExtractor, MetadataKey, MetadataRecord};
pub use stager::{PackageStager, StagePhase, StageReport};
