/*
 *  plugin/ffi.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  C ABI types for the editing module interface
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

//! FFI types for the pixedit module system
//!
//! This module defines C-compatible types that form the stable ABI
//! between the host application and editing modules. All types use
//! `#[repr(C)]` to ensure consistent memory layout across compilation units.
//! Module crates carry an identical copy of these definitions.

use std::ffi::c_char;

use crate::buffer::PixelBuffer;
use crate::error::EditorError;

/// Module ABI version
pub const PIXEDIT_MODULE_ABI_VERSION_MAJOR: u32 = 1;
pub const PIXEDIT_MODULE_ABI_VERSION_MINOR: u32 = 0;
pub const PIXEDIT_MODULE_ABI_VERSION_PATCH: u32 = 0;

/// Maximum length for error messages
pub const PIXEDIT_ERROR_MESSAGE_SIZE: usize = 256;

/// Maximum length for module metadata strings
pub const PIXEDIT_MODULE_NAME_SIZE: usize = 64;
pub const PIXEDIT_MODULE_VERSION_SIZE: usize = 32;

/// Symbol every module exports
pub const PIXEDIT_MODULE_REGISTER_SYMBOL: &[u8] = b"pixedit_module_register\0";

/// Error codes returned by module functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixEditErrorCode {
    /// Operation completed successfully
    Success = 0,

    /// Generic error
    ErrorGeneric = 1,

    /// Invalid argument passed to function
    ErrorInvalidArgument = 2,

    /// Null pointer passed where non-null expected
    ErrorNullPointer = 3,

    /// Panic occurred in module code
    ErrorPanic = 4,

    /// Pixel layout the module cannot handle
    ErrorUnsupportedFormat = 5,
}

/// Error information structure
#[repr(C)]
pub struct PixEditError {
    /// Error code
    pub code: PixEditErrorCode,

    /// Human-readable error message (null-terminated)
    pub message: [c_char; PIXEDIT_ERROR_MESSAGE_SIZE],
}

impl PixEditError {
    /// Create a new error with code and message
    pub fn new(code: PixEditErrorCode, message: &str) -> Self {
        let mut error = Self {
            code,
            message: [0; PIXEDIT_ERROR_MESSAGE_SIZE],
        };

        let bytes = message.as_bytes();
        let len = bytes.len().min(PIXEDIT_ERROR_MESSAGE_SIZE - 1);

        for (i, &byte) in bytes.iter().take(len).enumerate() {
            error.message[i] = byte as c_char;
        }

        error
    }

    /// Create a success error (no error)
    pub fn success() -> Self {
        Self::new(PixEditErrorCode::Success, "")
    }

    /// Extract error message as Rust string
    pub fn message_str(&self) -> String {
        extract_string(&self.message)
    }

    /// Convert into the host error type for module `name`
    pub fn into_editor_error(self, name: &str) -> EditorError {
        let message = self.message_str();
        let reason = match self.code {
            PixEditErrorCode::Success => "no error".to_string(),
            PixEditErrorCode::ErrorUnsupportedFormat => {
                return EditorError::UnsupportedFormat(message);
            }
            PixEditErrorCode::ErrorNullPointer => format!("null pointer: {}", message),
            _ => message,
        };
        EditorError::ModuleFailed {
            name: name.to_string(),
            reason,
        }
    }
}

impl Default for PixEditError {
    fn default() -> Self {
        Self::success()
    }
}

/// Pixel buffer as seen across the ABI boundary
///
/// `data` points at `len` bytes laid out as `height` rows of `stride`
/// bytes, each row holding `width` interleaved RGB triples.
#[repr(C)]
pub struct PixEditImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub stride: usize,
    pub data: *mut u8,
    pub len: usize,
}

impl PixEditImage {
    /// Read-only descriptor over `buffer`; modules must not write through it
    pub fn borrowed(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            channels: buffer.channels(),
            stride: buffer.stride(),
            data: buffer.as_bytes().as_ptr() as *mut u8,
            len: buffer.as_bytes().len(),
        }
    }

    /// Writable descriptor over `buffer`
    pub fn borrowed_mut(buffer: &mut PixelBuffer) -> Self {
        let width = buffer.width();
        let height = buffer.height();
        let channels = buffer.channels();
        let stride = buffer.stride();
        let bytes = buffer.as_bytes_mut();
        Self {
            width,
            height,
            channels,
            stride,
            data: bytes.as_mut_ptr(),
            len: bytes.len(),
        }
    }
}

/// Module vtable - function pointers for all module operations
#[repr(C)]
pub struct PixEditModuleVTable {
    /// Get module ABI version (major, minor, patch)
    pub abi_version: extern "C" fn(
        major: *mut u32,
        minor: *mut u32,
        patch: *mut u32
    ),

    /// Get module metadata (display name, version)
    pub module_info: extern "C" fn(
        name: *mut c_char,
        version: *mut c_char
    ),

    /// Transform `input` into `output`
    ///
    /// `output` arrives as a copy of `input`. The module writes pixels through
    /// `output.data` and reports the resulting geometry in `output`.
    pub edit: extern "C" fn(
        input: *const PixEditImage,
        output: *mut PixEditImage,
        error: *mut PixEditError
    ) -> PixEditErrorCode,
}

/// Module registration function type
///
/// Each module must export a function with this signature:
/// ```c
/// #[no_mangle]
/// pub extern "C" fn pixedit_module_register() -> *const PixEditModuleVTable
/// ```
pub type ModuleRegisterFn = extern "C" fn() -> *const PixEditModuleVTable;

/// Extract a null-terminated string from a C buffer
pub fn extract_string(buffer: &[c_char]) -> String {
    let len = buffer.iter()
        .position(|&c| c == 0)
        .unwrap_or(buffer.len());

    let bytes: Vec<u8> = buffer[..len]
        .iter()
        .map(|&c| c as u8)
        .collect();

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_truncated() {
        let long = "x".repeat(PIXEDIT_ERROR_MESSAGE_SIZE * 2);
        let error = PixEditError::new(PixEditErrorCode::ErrorGeneric, &long);
        assert_eq!(error.message_str().len(), PIXEDIT_ERROR_MESSAGE_SIZE - 1);
    }

    #[test]
    fn test_error_conversion() {
        let error = PixEditError::new(PixEditErrorCode::ErrorGeneric, "kernel too large");
        match error.into_editor_error("Blur") {
            EditorError::ModuleFailed { name, reason } => {
                assert_eq!(name, "Blur");
                assert_eq!(reason, "kernel too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let error = PixEditError::new(PixEditErrorCode::ErrorUnsupportedFormat, "4 channels");
        assert!(matches!(
            error.into_editor_error("Blur"),
            EditorError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_image_descriptor_matches_buffer() {
        let mut buffer = PixelBuffer::new(5, 3).unwrap();
        let desc = PixEditImage::borrowed_mut(&mut buffer);
        assert_eq!(desc.width, 5);
        assert_eq!(desc.height, 3);
        assert_eq!(desc.channels, 3);
        assert_eq!(desc.stride, 16);
        assert_eq!(desc.len, 48);
    }

    #[test]
    fn test_extract_string_stops_at_nul() {
        let buf: [c_char; 6] = [b'B' as c_char, b'l' as c_char, 0, b'x' as c_char, 0, 0];
        assert_eq!(extract_string(&buf), "Bl");
    }
}
