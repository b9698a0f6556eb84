/*
 *  pixedit Sharpen Module - FFI Types
 *
 *  C ABI types matching the pixedit module interface
 *  These types must match exactly with the host's FFI types
 */

use std::ffi::c_char;

/// Module ABI version
pub const PIXEDIT_MODULE_ABI_VERSION_MAJOR: u32 = 1;
pub const PIXEDIT_MODULE_ABI_VERSION_MINOR: u32 = 0;
pub const PIXEDIT_MODULE_ABI_VERSION_PATCH: u32 = 0;

/// Maximum length for error messages
pub const PIXEDIT_ERROR_MESSAGE_SIZE: usize = 256;

/// Maximum length for module metadata strings
pub const PIXEDIT_MODULE_NAME_SIZE: usize = 64;
pub const PIXEDIT_MODULE_VERSION_SIZE: usize = 32;

/// Error codes returned by module functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixEditErrorCode {
    Success = 0,
    ErrorGeneric = 1,
    ErrorInvalidArgument = 2,
    ErrorNullPointer = 3,
    ErrorPanic = 4,
    ErrorUnsupportedFormat = 5,
}

/// Error information structure
#[repr(C)]
pub struct PixEditError {
    pub code: PixEditErrorCode,
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
}

/// Pixel buffer as seen across the ABI boundary
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
    /// Check the descriptor describes a readable 8-bit RGB buffer
    pub fn validate(&self) -> Result<(), (PixEditErrorCode, String)> {
        if self.data.is_null() {
            return Err((PixEditErrorCode::ErrorNullPointer, "null pixel data".to_string()));
        }
        if self.channels != 3 {
            return Err((
                PixEditErrorCode::ErrorUnsupportedFormat,
                format!("expected 3 channels, got {}", self.channels),
            ));
        }
        if self.stride < self.width as usize * 3
            || self.len < self.stride * self.height as usize
        {
            return Err((
                PixEditErrorCode::ErrorInvalidArgument,
                format!(
                    "inconsistent geometry {}x{} stride {} len {}",
                    self.width, self.height, self.stride, self.len
                ),
            ));
        }
        Ok(())
    }
}

/// Module vtable - function pointers for all module operations
#[repr(C)]
pub struct PixEditModuleVTable {
    pub abi_version: extern "C" fn(*mut u32, *mut u32, *mut u32),
    pub module_info: extern "C" fn(*mut c_char, *mut c_char),
    pub edit: extern "C" fn(
        *const PixEditImage,
        *mut PixEditImage,
        *mut PixEditError
    ) -> PixEditErrorCode,
}

/// Helper to copy string to C buffer
pub fn copy_str_to_buffer(s: &str, buffer: *mut c_char, max_len: usize) {
    if buffer.is_null() {
        return;
    }

    let bytes = s.as_bytes();
    let len = bytes.len().min(max_len - 1);

    unsafe {
        for (i, &byte) in bytes.iter().take(len).enumerate() {
            *buffer.add(i) = byte as c_char;
        }
        *buffer.add(len) = 0; // Null terminator
    }
}
