/*
 *  plugin/adapter.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Module adapter - wraps C ABI modules as Rust trait objects
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

use std::panic::{self, AssertUnwindSafe};
use log::{debug, error};

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::error::EditorError;
use crate::module::EditingModule;
use super::ffi::{
    PixEditErrorCode,
    PixEditError,
    PixEditImage,
    PixEditModuleVTable,
};
use super::loader::LoadedPlugin;

/// Adapter that wraps a loaded library to implement `EditingModule`
///
/// This struct provides the bridge between the C ABI module interface
/// and Rust's EditingModule trait. It handles:
///
/// - FFI safety and error conversion
/// - Validation of the geometry the module reports back
/// - Keeping the library mapped for as long as the module is registered
pub struct PluginModule {
    /// The loaded library (kept alive for vtable access)
    plugin: LoadedPlugin,
}

impl PluginModule {
    pub fn new(plugin: LoadedPlugin) -> Self {
        Self { plugin }
    }
}

impl EditingModule for PluginModule {
    fn name(&self) -> &str {
        &self.plugin.metadata().name
    }

    fn version(&self) -> &str {
        &self.plugin.metadata().version
    }

    fn edit(&self, input: PixelBuffer) -> Result<PixelBuffer, EditorError> {
        invoke_edit(self.plugin.vtable(), self.name(), input)
    }
}

/// Run `vtable.edit` on a host-owned copy of `input` and check what the
/// module reported back before handing the copy out.
pub(crate) fn invoke_edit(
    vtable: &PixEditModuleVTable,
    name: &str,
    input: PixelBuffer,
) -> Result<PixelBuffer, EditorError> {
    let mut output = input.clone();
    let in_desc = PixEditImage::borrowed(&input);
    let mut out_desc = PixEditImage::borrowed_mut(&mut output);
    let storage = (out_desc.data, out_desc.len);
    let mut error = PixEditError::default();

    debug!("Invoking module '{}' on {}x{}", name, in_desc.width, in_desc.height);

    let (result, panic_error) = catch_ffi_call(|| {
        (vtable.edit)(&in_desc, &mut out_desc, &mut error)
    });

    if let Some(e) = panic_error {
        return Err(e.into_editor_error(name));
    }

    if result != PixEditErrorCode::Success {
        return Err(error.into_editor_error(name));
    }

    if (out_desc.data, out_desc.len) != storage {
        return Err(EditorError::ModuleFailed {
            name: name.to_string(),
            reason: "module replaced the output storage".to_string(),
        });
    }

    if out_desc.channels != CHANNELS {
        return Err(EditorError::ModuleFailed {
            name: name.to_string(),
            reason: format!("module reported {} channels", out_desc.channels),
        });
    }

    // The bytes stay in `output`; only a reported geometry change can
    // signal a reshaped result, and that is never committed.
    if out_desc.width != input.width() || out_desc.height != input.height() {
        return Err(EditorError::InvalidPluginOutput {
            expected_width: input.width(),
            expected_height: input.height(),
            actual_width: out_desc.width,
            actual_height: out_desc.height,
        });
    }

    Ok(output)
}

/// Wrap an FFI call with panic safety
///
/// Catches panics raised on the host side of the call and converts them
/// to error codes. A panic inside an `extern "C"` module function cannot
/// unwind this far: the runtime aborts at that boundary, so Rust modules
/// must catch their own panics (the bundled modules do, in `catch_panic!`)
/// and report `ErrorPanic` through the error struct.
///
/// Returns (error_code, error_info)
pub(crate) fn catch_ffi_call<F>(f: F) -> (PixEditErrorCode, Option<PixEditError>)
where
    F: FnOnce() -> PixEditErrorCode,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => (code, None),
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                format!("Plugin panic: {}", s)
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                format!("Plugin panic: {}", s)
            } else {
                "Plugin panic: unknown error".to_string()
            };

            error!("Caught panic in module FFI call: {}", message);
            let panic_error = PixEditError::new(PixEditErrorCode::ErrorPanic, &message);
            (PixEditErrorCode::ErrorPanic, Some(panic_error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;

    extern "C" fn abi_version(major: *mut u32, minor: *mut u32, patch: *mut u32) {
        unsafe {
            *major = 1;
            *minor = 0;
            *patch = 0;
        }
    }

    extern "C" fn module_info(_name: *mut c_char, _version: *mut c_char) {}

    fn vtable(
        edit: extern "C" fn(*const PixEditImage, *mut PixEditImage, *mut PixEditError) -> PixEditErrorCode,
    ) -> PixEditModuleVTable {
        PixEditModuleVTable { abi_version, module_info, edit }
    }

    extern "C" fn invert(
        _input: *const PixEditImage,
        output: *mut PixEditImage,
        _error: *mut PixEditError,
    ) -> PixEditErrorCode {
        let out = unsafe { &*output };
        let bytes = unsafe { std::slice::from_raw_parts_mut(out.data, out.len) };
        for b in bytes {
            *b = 255 - *b;
        }
        PixEditErrorCode::Success
    }

    extern "C" fn swap_storage(
        input: *const PixEditImage,
        output: *mut PixEditImage,
        _error: *mut PixEditError,
    ) -> PixEditErrorCode {
        unsafe { (*output).data = (*input).data };
        PixEditErrorCode::Success
    }

    extern "C" fn add_alpha(
        _input: *const PixEditImage,
        output: *mut PixEditImage,
        _error: *mut PixEditError,
    ) -> PixEditErrorCode {
        unsafe { (*output).channels = 4 };
        PixEditErrorCode::Success
    }

    extern "C" fn halve_width(
        _input: *const PixEditImage,
        output: *mut PixEditImage,
        _error: *mut PixEditError,
    ) -> PixEditErrorCode {
        unsafe { (*output).width /= 2 };
        PixEditErrorCode::Success
    }

    extern "C" fn report_panic(
        _input: *const PixEditImage,
        _output: *mut PixEditImage,
        error: *mut PixEditError,
    ) -> PixEditErrorCode {
        unsafe { *error = PixEditError::new(PixEditErrorCode::ErrorPanic, "Module panic: kernel") };
        PixEditErrorCode::ErrorPanic
    }

    fn sample() -> PixelBuffer {
        let mut buffer = PixelBuffer::new(4, 2).unwrap();
        buffer.put_pixel(3, 1, [10, 20, 30]);
        buffer
    }

    #[test]
    fn test_invoke_edit_commits_module_bytes() {
        let input = sample();
        let out = invoke_edit(&vtable(invert), "Invert", input.clone()).unwrap();
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(out.pixel(3, 1), [245, 235, 225]);
        assert_eq!(out.pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_invoke_edit_rejects_replaced_storage() {
        let err = invoke_edit(&vtable(swap_storage), "Swap", sample()).unwrap_err();
        assert!(matches!(
            err,
            EditorError::ModuleFailed { ref reason, .. } if reason.contains("storage")
        ));
    }

    #[test]
    fn test_invoke_edit_rejects_channel_change() {
        let err = invoke_edit(&vtable(add_alpha), "Alpha", sample()).unwrap_err();
        assert!(matches!(
            err,
            EditorError::ModuleFailed { ref reason, .. } if reason.contains("4 channels")
        ));
    }

    #[test]
    fn test_invoke_edit_rejects_reported_reshape() {
        let err = invoke_edit(&vtable(halve_width), "Halve", sample()).unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidPluginOutput {
                expected_width: 4,
                expected_height: 2,
                actual_width: 2,
                actual_height: 2,
            }
        ));
    }

    #[test]
    fn test_invoke_edit_reports_module_side_panic() {
        let err = invoke_edit(&vtable(report_panic), "Blur", sample()).unwrap_err();
        match err {
            EditorError::ModuleFailed { name, reason } => {
                assert_eq!(name, "Blur");
                assert_eq!(reason, "Module panic: kernel");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_catch_ffi_call_success() {
        let (result, panic_error) = catch_ffi_call(|| PixEditErrorCode::Success);
        assert_eq!(result, PixEditErrorCode::Success);
        assert!(panic_error.is_none());
    }

    #[test]
    fn test_catch_ffi_call_panic() {
        let (result, panic_error) = catch_ffi_call(|| panic!("Test panic"));
        assert_eq!(result, PixEditErrorCode::ErrorPanic);
        let error = panic_error.unwrap();
        assert!(error.message_str().contains("Plugin panic"));
        assert!(matches!(
            error.into_editor_error("Blur"),
            EditorError::ModuleFailed { .. }
        ));
    }
}
