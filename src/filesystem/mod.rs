use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// Wrapper for standard IO errors.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Error for empty path input.
    #[error("Path is empty")]
    EmptyPath,
    /// The path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Lists the file names in `dir` that end with `extension`, sorted.
///
/// The suffix match is case-sensitive. Subdirectories and names that are not valid UTF-8
/// are skipped.
///
/// # Arguments
///
/// * `dir` - Directory to list.
/// * `extension` - Required file name suffix, e.g. `.jar`.
///
/// # Errors
///
/// Returns `FilesystemError` if the path is empty, is not a directory, or cannot be read.
///
/// # Returns
///
/// The matching file names, without their directory.
pub fn list_archives<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<String>, FilesystemError> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(FilesystemError::EmptyPath);
    }
    if dir.exists() && !dir.is_dir() {
        return Err(FilesystemError::NotADirectory(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.ends_with(extension) => names.push(name),
            Ok(_) => {}
            Err(raw) => log::debug!("Skipping non UTF-8 file name: {:?}", raw),
        }
    }

    names.sort();
    log::debug!("Found {} archives in {}", names.len(), dir.display());
    Ok(names)
}

/// Deletes a single file.
///
/// Deletion is irrecoverable. A file that vanished before deletion is an error, so a
/// failed removal is never mistaken for a successful one.
///
/// # Arguments
///
/// * `path` - Path of the file to delete.
///
/// # Errors
///
/// Returns `FilesystemError` if the file cannot be removed.
pub fn remove_file<P: AsRef<Path>>(path: P) -> Result<(), FilesystemError> {
    let p = path.as_ref();
    fs::remove_file(p)?;
    log::debug!("Removed {}", p.display());
    Ok(())
}

/// Writes content to a file, replacing anything already there.
///
/// # Arguments
///
/// * `path` - Path of the report file.
/// * `content` - Full report text.
///
/// # Errors
///
/// Returns `FilesystemError` if the write fails.
pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<(), FilesystemError> {
    let mut file = fs::File::create(path.as_ref())?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Expands a path that starts with `~` to the user's home directory.
///
/// # Arguments
///
/// * `path` - Path string, possibly starting with `~`.
///
/// # Returns
///
/// The expanded `PathBuf`, or empty if expansion fails.
pub fn expand_home(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return PathBuf::new();
    }
    if !path.starts_with('~') {
        return PathBuf::from(path);
    }
    let home = match dirs::home_dir() {
        Some(h) => h,
        None => return PathBuf::new(),
    };
    if path == "~" {
        return home;
    }
    if path.starts_with("~/") || path.starts_with("~\\") {
        let without_tilde = &path[2..];
        return home.join(without_tilde);
    }
    PathBuf::new()
}
