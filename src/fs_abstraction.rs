//! Filesystem abstraction layer for testability
//!
//! The renderer only needs a handful of operations on the output directory.
//! Putting them behind a trait lets tests assert the replace-then-write
//! ordering with mockall instead of racing against a real directory.

use std::io::{self, Write};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Filesystem operations used to publish output artifacts.
///
/// # Example (production)
/// ```ignore
/// use ikuai_ipgroup::fs_abstraction::{FileSystem, real_fs};
///
/// real_fs().write_atomic(Path::new("out.txt"), b"id=60 ...\n")?;
/// ```
///
/// # Example (testing)
/// ```ignore
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_exists().returning(|_| false);
/// mock_fs.expect_write_atomic().returning(|_, _| Ok(()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write the full contents to a sibling temporary file, then rename it
    /// over `path`. A reader never observes a partially written file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Real filesystem implementation using std::fs and tempfile.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
///
/// For testing, create a `MockFileSystem` instead.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
