//! Functions for interacting with the file system.

use crate::error::CiteError;
use slog::debug;
use std::{fs, path::Path};

/// Load a file into a string.
///
/// Used to read bibliography files before they are parsed.
pub fn load_file(path: &Path) -> Result<String, CiteError> {
    debug!(
        slog_scope::logger(),
        "Loading file {}...",
        path.to_string_lossy()
    );

    match fs::read_to_string(path) {
        Ok(r) => {
            debug!(
                slog_scope::logger(),
                "File {} loaded.",
                path.to_string_lossy()
            );
            Ok(r)
        }
        Err(e) => Err(CiteError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Save a string in a file.
///
/// Used to write out the active bibliography.
pub fn save_file(path: &Path, output: &str) -> Result<(), CiteError> {
    debug!(slog_scope::logger(), "Saving {}...", path.to_string_lossy());

    match fs::write(path, output) {
        Ok(_) => {
            debug!(
                slog_scope::logger(),
                "File {} saved.",
                path.to_string_lossy()
            );
            Ok(())
        }
        Err(e) => Err(CiteError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
