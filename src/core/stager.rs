//! Package staging
//!
//! Runs the four phases in order: clean the output root, copy manifest
//! entries into it, render the control file, and build the archive.
//! A failing phase stops the run and leaves earlier work on disk; the
//! next run's clean phase removes it.

use crate::{
    config::Config,
    core::{
        control::ControlTemplate,
        manifest::{CopyEntry, Manifest, PathTokens},
        metadata::{MetadataExtractor, MetadataRecord},
    },
    error::{Result, StagerError},
    utils::{fs::FileSystemUtils, process::ProcessRunner},
};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Progress of a run; each phase is only entered after the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StagePhase {
    Start,
    Cleaned,
    Staged,
    Rendered,
    Packaged,
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StagePhase::Start => "start",
            StagePhase::Cleaned => "cleaned",
            StagePhase::Staged => "staged",
            StagePhase::Rendered => "rendered",
            StagePhase::Packaged => "packaged",
        };
        f.write_str(name)
    }
}

/// What kind of source a manifest entry copied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A manifest entry that was copied into the staged tree
#[derive(Debug, Clone)]
pub struct CopiedEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: EntryKind,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct StageReport {
    pub phase: StagePhase,
    pub copied: Vec<CopiedEntry>,
    pub control_file: Option<PathBuf>,
    pub artifact: Option<PathBuf>,
}

impl StageReport {
    fn new() -> Self {
        Self {
            phase: StagePhase::Start,
            copied: Vec::new(),
            control_file: None,
            artifact: None,
        }
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dirs = self
            .copied
            .iter()
            .filter(|entry| entry.kind == EntryKind::Directory)
            .count();
        write!(
            f,
            "Reached phase '{}': {} entries staged ({} files, {} directories)",
            self.phase,
            self.copied.len(),
            self.copied.len() - dirs,
            dirs
        )?;
        if let Some(control_file) = &self.control_file {
            write!(f, ", control file {}", control_file.display())?;
        }
        if let Some(artifact) = &self.artifact {
            write!(f, ", artifact {}", artifact.display())?;
        }
        Ok(())
    }
}

/// Builds a Debian package tree and archive from a manifest
pub struct PackageStager {
    config: Config,
    fs_utils: FileSystemUtils,
    process_runner: ProcessRunner,
}

impl PackageStager {
    /// Create a new stager with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            fs_utils: FileSystemUtils::new(),
            process_runner: ProcessRunner::new(config.debug),
            config,
        }
    }

    /// Run every phase in order.
    ///
    /// Packaging is skipped when disabled in the configuration, in which
    /// case the run ends at [`StagePhase::Rendered`].
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<StageReport> {
        let mut report = StageReport::new();

        self.clean()?;
        report.phase = StagePhase::Cleaned;

        report.copied = self.stage_files()?;
        report.phase = StagePhase::Staged;

        let (control_file, metadata) = self.render_control()?;
        report.control_file = Some(control_file);
        report.phase = StagePhase::Rendered;

        if self.config.packaging.enabled {
            report.artifact = Some(self.package(&metadata)?);
            report.phase = StagePhase::Packaged;
        } else {
            info!("Packaging disabled, stopping after control file");
        }

        Ok(report)
    }

    /// Remove the output root and everything in it
    #[instrument(skip(self))]
    pub fn clean(&self) -> Result<()> {
        let deb_dir = &self.config.staging.deb_dir;
        info!("Cleaning output directory: {}", deb_dir.display());

        self.fs_utils
            .remove_dir_all_if_exists(deb_dir)
            .map_err(|e| StagerError::file_system("remove directory", deb_dir, e))?;
        Ok(())
    }

    /// Recreate the output root and copy every manifest entry into it
    #[instrument(skip(self))]
    pub fn stage_files(&self) -> Result<Vec<CopiedEntry>> {
        let deb_dir = &self.config.staging.deb_dir;
        self.fs_utils
            .create_dir_all(deb_dir)
            .map_err(|e| StagerError::file_system("create directory", deb_dir, e))?;

        let tokens = PathTokens::new(&self.config.root_dir, deb_dir)?;
        let manifest = Manifest::load(&self.fs_utils, &self.config.staging.manifest_path, &tokens)?;

        info!("Copying files to \"{}\"", deb_dir.display());
        let total = manifest.len();
        let mut copied = Vec::with_capacity(total);

        for (i, entry) in manifest.entries.iter().enumerate() {
            let copied_entry = self.copy_entry(entry)?;
            match copied_entry.kind {
                EntryKind::File => info!(
                    "  {}/{}: {} -> {}",
                    i + 1,
                    total,
                    copied_entry.source.display(),
                    copied_entry.destination.display()
                ),
                EntryKind::Directory => info!(
                    "  {}/{}: {} -> {} (dir)",
                    i + 1,
                    total,
                    copied_entry.source.display(),
                    copied_entry.destination.display()
                ),
            }
            copied.push(copied_entry);
        }

        info!("Finished copying files");
        Ok(copied)
    }

    /// Copy a single entry, creating the destination's parent first.
    ///
    /// A file copied onto an existing directory lands inside it under
    /// its own name.
    fn copy_entry(&self, entry: &CopyEntry) -> Result<CopiedEntry> {
        let CopyEntry {
            source,
            destination,
            line,
        } = entry;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                self.fs_utils
                    .create_dir_all(parent)
                    .map_err(|e| StagerError::file_system("create directory", parent, e))?;
            }
        }

        if source.is_file() {
            let target = match source.file_name() {
                Some(name) if destination.is_dir() => destination.join(name),
                _ => destination.clone(),
            };
            self.fs_utils
                .copy_file(source, &target)
                .map_err(|e| StagerError::file_system("copy file", source, e))?;
            Ok(CopiedEntry {
                source: source.clone(),
                destination: target,
                kind: EntryKind::File,
            })
        } else if source.is_dir() {
            self.fs_utils
                .copy_dir_all(source, destination)
                .map_err(|e| StagerError::file_system("copy directory", source, e))?;
            Ok(CopiedEntry {
                source: source.clone(),
                destination: destination.clone(),
                kind: EntryKind::Directory,
            })
        } else {
            Err(StagerError::missing_source(source, *line))
        }
    }

    /// Render the control template into the staged tree.
    ///
    /// All metadata is resolved before anything is written, so a missing
    /// declaration leaves no control file behind.
    #[instrument(skip(self))]
    pub fn render_control(&self) -> Result<(PathBuf, MetadataRecord)> {
        let staging = &self.config.staging;
        let metadata_dir = staging.metadata_dir();
        self.fs_utils
            .create_dir_all(&metadata_dir)
            .map_err(|e| StagerError::file_system("create directory", &metadata_dir, e))?;

        let control_path = staging.control_path();
        info!("Preparing control file \"{}\"", control_path.display());

        let template = ControlTemplate::load(&self.fs_utils, &staging.template_path)?;
        let extractor = MetadataExtractor::load(
            &self.fs_utils,
            &staging.declarations_path,
            &self.config.target,
        )?;
        let record = extractor.record()?;
        let rendered = template.render(&record)?;

        self.fs_utils
            .write_file(&control_path, rendered)
            .map_err(|e| StagerError::file_system("write", &control_path, e))?;
        debug!("Control file written for {}", record.package_name);

        Ok((control_path, record))
    }

    /// Build the archive from the staged tree with the packaging tool
    #[instrument(skip(self, record))]
    pub fn package(&self, record: &MetadataRecord) -> Result<PathBuf> {
        let artifact = self.config.artifact_path(&record.artifact_file_name());
        info!("Building package \"{}\"", artifact.display());

        self.fs_utils
            .create_dir_all(&self.config.output_dir)
            .map_err(|e| StagerError::file_system("create directory", &self.config.output_dir, e))?;

        let deb_dir = self.config.staging.deb_dir.to_string_lossy().to_string();
        let artifact_str = artifact.to_string_lossy().to_string();
        let mut args: Vec<&str> = self
            .config
            .packaging
            .args
            .iter()
            .map(String::as_str)
            .collect();
        args.push(&deb_dir);
        args.push(&artifact_str);

        self.process_runner
            .run_command(&self.config.packaging.tool, &args)
            .map_err(|e| {
                let message = match &e {
                    StagerError::Process {
                        exit_code: Some(code),
                        ..
                    } => format!("{} exited with status {code}", self.config.packaging.tool),
                    _ => format!("could not run {}", self.config.packaging.tool),
                };
                StagerError::packaging(&artifact, message, Some(e))
            })?;

        info!("Package built: {}", artifact.display());
        Ok(artifact)
    }
}
