/*
 *  error.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Unified error types for the editing core
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all editing operations
///
/// Load-time variants (`ModuleLoad`, `ModuleNotConforming`) are logged by the
/// registry and never abort startup. Everything else is reported back to the
/// caller and leaves the session untouched.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Image file missing or undecodable
    #[error("Cannot decode image {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    /// Image could not be written
    #[error("Cannot save image {}: {reason}", path.display())]
    ImageEncode { path: PathBuf, reason: String },

    /// Channel layout or file type cannot be normalized to 8-bit RGB
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Dynamic module file could not be opened
    #[error("Failed to load module {}: {reason}", path.display())]
    ModuleLoad { path: PathBuf, reason: String },

    /// Module loaded but does not implement the editing contract
    #[error("Module {} does not conform: {reason}", path.display())]
    ModuleNotConforming { path: PathBuf, reason: String },

    /// Second module with an already registered name, under the reject policy
    #[error("Module {} duplicates the name '{name}'", path.display())]
    DuplicateModule { name: String, path: PathBuf },

    /// Activation referenced a name missing from the registry
    #[error("No plugin is found: {0}")]
    PluginNotFound(String),

    /// Module returned a buffer of the wrong shape
    #[error("Invalid plugin output: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    InvalidPluginOutput {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Module reported failure or panicked during `edit`
    #[error("Module '{name}' failed: {reason}")]
    ModuleFailed { name: String, reason: String },

    /// Edit, undo, navigate or save attempted with no image loaded
    #[error("No image to edit")]
    NoImageLoaded,

    /// Malformed pixel buffer geometry
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// True for the errors a registry scan tolerates and skips over
    pub fn is_load_time(&self) -> bool {
        matches!(
            self,
            EditorError::ModuleLoad { .. }
                | EditorError::ModuleNotConforming { .. }
                | EditorError::DuplicateModule { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_time_classification() {
        let load = EditorError::ModuleLoad {
            path: PathBuf::from("libx.so"),
            reason: "bad elf".into(),
        };
        assert!(load.is_load_time());
        assert!(!EditorError::NoImageLoaded.is_load_time());
        assert!(!EditorError::PluginNotFound("Blur".into()).is_load_time());
    }

    #[test]
    fn test_invalid_output_message() {
        let err = EditorError::InvalidPluginOutput {
            expected_width: 100,
            expected_height: 50,
            actual_width: 50,
            actual_height: 50,
        };
        assert_eq!(
            err.to_string(),
            "Invalid plugin output: expected 100x50, got 50x50"
        );
    }
}
