//! File system utility functions
//!
//! Provides the copy, removal and read/write primitives the stager is built on.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Copy a file from source to destination, preserving permissions.
    ///
    /// An existing destination file is overwritten.
    #[instrument(skip(self))]
    pub fn copy_file<P: AsRef<Path> + std::fmt::Debug, Q: AsRef<Path> + std::fmt::Debug>(
        &self,
        src: P,
        dst: Q,
    ) -> io::Result<u64> {
        let src = src.as_ref();
        let dst = dst.as_ref();

        debug!("Copying file: {} -> {}", src.display(), dst.display());

        let bytes_copied = fs::copy(src, dst)?;

        let metadata = fs::metadata(src)?;
        fs::set_permissions(dst, metadata.permissions())?;

        debug!("Successfully copied {} bytes", bytes_copied);
        Ok(bytes_copied)
    }

    /// Recursively copy a directory tree.
    ///
    /// The destination must not exist yet. Symlinks are followed, so the
    /// staged tree holds their contents rather than the links.
    #[instrument(skip(self))]
    pub fn copy_dir_all<P: AsRef<Path> + std::fmt::Debug, Q: AsRef<Path> + std::fmt::Debug>(
        &self,
        src: P,
        dst: Q,
    ) -> io::Result<usize> {
        let src = src.as_ref();
        let dst = dst.as_ref();

        if dst.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination already exists: {}", dst.display()),
            ));
        }

        debug!("Copying directory: {} -> {}", src.display(), dst.display());

        let mut files_copied = 0;
        for entry in WalkDir::new(src).follow_links(true) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let target = dst.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
                let metadata = fs::metadata(entry.path())?;
                fs::set_permissions(&target, metadata.permissions())?;
            } else {
                self.copy_file(entry.path(), &target)?;
                files_copied += 1;
            }
        }

        debug!("Copied {} files from {}", files_copied, src.display());
        Ok(files_copied)
    }

    /// Create directories recursively
    #[instrument(skip(self))]
    pub fn create_dir_all<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        debug!("Creating directory: {}", path.display());
        fs::create_dir_all(path)
    }

    /// Remove a directory and all its contents if it exists
    #[instrument(skip(self))]
    pub fn remove_dir_all_if_exists<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<bool> {
        let path = path.as_ref();

        match fs::remove_dir_all(path) {
            Ok(()) => {
                debug!("Removed directory: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Directory does not exist: {}", path.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Write content to a file, creating parent directories if needed
    #[instrument(skip(self, contents))]
    pub fn write_file<P: AsRef<Path> + std::fmt::Debug, C: AsRef<[u8]>>(
        &self,
        path: P,
        contents: C,
    ) -> io::Result<()> {
        let path = path.as_ref();

        debug!("Writing file: {}", path.display());

        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        debug!("File written successfully");
        Ok(())
    }

    /// Read file contents as string
    #[instrument(skip(self))]
    pub fn read_file_to_string<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<String> {
        let path = path.as_ref();
        debug!("Reading file: {}", path.display());
        fs::read_to_string(path)
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let src = temp_dir.path().join("source.txt");
        let dst = temp_dir.path().join("dest.txt");

        fs::write(&src, "test content").unwrap();
        fs::write(&dst, "stale").unwrap();

        let bytes_copied = fs_utils.copy_file(&src, &dst).unwrap();
        assert_eq!(bytes_copied, 12); // "test content"
        assert_eq!(fs::read_to_string(&dst).unwrap(), "test content");
        assert!(src.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_keeps_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let src = temp_dir.path().join("app");
        let dst = temp_dir.path().join("app-copy");
        fs::write(&src, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();

        fs_utils.copy_file(&src, &dst).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_copy_dir_all() {
        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let src = temp_dir.path().join("lib");
        fs::create_dir_all(src.join("std").join("empty")).unwrap();
        fs::write(src.join("std").join("io.evi"), "io").unwrap();
        fs::write(src.join("top.evi"), "top").unwrap();

        let dst = temp_dir.path().join("out").join("lib");
        fs::create_dir_all(dst.parent().unwrap()).unwrap();

        let copied = fs_utils.copy_dir_all(&src, &dst).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("std").join("io.evi")).unwrap(), "io");
        assert_eq!(fs::read_to_string(dst.join("top.evi")).unwrap(), "top");
        assert!(dst.join("std").join("empty").is_dir());
    }

    #[test]
    fn test_copy_dir_all_rejects_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();

        let err = fs_utils.copy_dir_all(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_remove_dir_all_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let dir = temp_dir.path().join("deb");
        assert!(!fs_utils.remove_dir_all_if_exists(&dir).unwrap());

        fs::create_dir_all(dir.join("usr").join("bin")).unwrap();
        fs::write(dir.join("usr").join("bin").join("app"), "bin").unwrap();
        assert!(fs_utils.remove_dir_all_if_exists(&dir).unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn test_write_and_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let fs_utils = FileSystemUtils::new();

        let file_path = temp_dir.path().join("subdir").join("test.txt");
        let content = "Hello, world!";

        fs_utils.write_file(&file_path, content).unwrap();
        let read_content = fs_utils.read_file_to_string(&file_path).unwrap();

        assert_eq!(content, read_content);
    }
}
