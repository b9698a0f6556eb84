/*
 *  pixedit Blur Module - Module Implementation
 *
 *  Normalized 8x8 box filter over 8-bit RGB pixels
 */

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::ffi::*;

/// Kernel edge length
const KERNEL: usize = 8;

/// Kernel anchor; the window covers [x - ANCHOR, x + KERNEL - ANCHOR)
const ANCHOR: usize = KERNEL / 2;

const CHANNELS: usize = 3;

/// Mirror an out-of-range coordinate back into [0, n) without repeating
/// the edge sample (dcb|abcd|cba)
fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * n - 2 - i;
        }
    }
    i as usize
}

/// Blur `src` into `dst`; both share `width`, `height` and `stride`
pub fn box_blur(src: &[u8], dst: &mut [u8], width: usize, height: usize, stride: usize) {
    if width == 0 || height == 0 {
        return;
    }

    // horizontal window sums, one u32 per channel sample
    let row_len = width * CHANNELS;
    let mut sums = vec![0u32; row_len * height];

    for y in 0..height {
        let row = &src[y * stride..y * stride + row_len];
        let out = &mut sums[y * row_len..(y + 1) * row_len];
        for x in 0..width {
            for k in 0..KERNEL {
                let sx = reflect_101(x as isize + k as isize - ANCHOR as isize, width);
                for c in 0..CHANNELS {
                    out[x * CHANNELS + c] += row[sx * CHANNELS + c] as u32;
                }
            }
        }
    }

    let area = (KERNEL * KERNEL) as u32;
    for y in 0..height {
        let out = &mut dst[y * stride..y * stride + row_len];
        for i in 0..row_len {
            let mut total = 0u32;
            for k in 0..KERNEL {
                let sy = reflect_101(y as isize + k as isize - ANCHOR as isize, height);
                total += sums[sy * row_len + i];
            }
            out[i] = ((total + area / 2) / area) as u8;
        }
    }
}

/// Macro to catch panics in FFI functions
macro_rules! catch_panic {
    ($error:expr, $code:block) => {
        match catch_unwind(AssertUnwindSafe(|| $code)) {
            Ok(result) => result,
            Err(panic_info) => {
                let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    format!("Module panic: {}", s)
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    format!("Module panic: {}", s)
                } else {
                    "Module panic: unknown error".to_string()
                };

                if !$error.is_null() {
                    unsafe {
                        *$error = PixEditError::new(PixEditErrorCode::ErrorPanic, &message);
                    }
                }
                PixEditErrorCode::ErrorPanic
            }
        }
    };
}

// ============================================================================
// FFI Vtable Implementations
// ============================================================================

/// Get module ABI version
extern "C" fn abi_version(major: *mut u32, minor: *mut u32, patch: *mut u32) {
    if !major.is_null() && !minor.is_null() && !patch.is_null() {
        unsafe {
            *major = PIXEDIT_MODULE_ABI_VERSION_MAJOR;
            *minor = PIXEDIT_MODULE_ABI_VERSION_MINOR;
            *patch = PIXEDIT_MODULE_ABI_VERSION_PATCH;
        }
    }
}

/// Get module metadata
extern "C" fn module_info(name: *mut c_char, version: *mut c_char) {
    copy_str_to_buffer("Blur", name, PIXEDIT_MODULE_NAME_SIZE);
    copy_str_to_buffer(env!("CARGO_PKG_VERSION"), version, PIXEDIT_MODULE_VERSION_SIZE);
}

/// Blur `input` into the host-allocated `output`
extern "C" fn edit(
    input: *const PixEditImage,
    output: *mut PixEditImage,
    error: *mut PixEditError
) -> PixEditErrorCode {
    catch_panic!(error, {
        if input.is_null() || output.is_null() || error.is_null() {
            if !error.is_null() {
                unsafe {
                    *error = PixEditError::new(
                        PixEditErrorCode::ErrorNullPointer,
                        "Null pointer passed to edit"
                    );
                }
            }
            return PixEditErrorCode::ErrorNullPointer;
        }

        let (src, dst) = unsafe { (&*input, &*output) };

        for image in [src, dst] {
            if let Err((code, message)) = image.validate() {
                unsafe {
                    *error = PixEditError::new(code, &message);
                }
                return code;
            }
        }

        if (src.width, src.height, src.stride) != (dst.width, dst.height, dst.stride) {
            unsafe {
                *error = PixEditError::new(
                    PixEditErrorCode::ErrorInvalidArgument,
                    "Output geometry differs from input"
                );
            }
            return PixEditErrorCode::ErrorInvalidArgument;
        }

        #[cfg(feature = "debug-logging")]
        log::debug!("Blur {}x{} stride {}", src.width, src.height, src.stride);

        let src_bytes = unsafe { std::slice::from_raw_parts(src.data as *const u8, src.len) };
        let dst_bytes = unsafe { std::slice::from_raw_parts_mut(dst.data, dst.len) };

        box_blur(
            src_bytes,
            dst_bytes,
            src.width as usize,
            src.height as usize,
            src.stride,
        );

        PixEditErrorCode::Success
    })
}

// ============================================================================
// Module Registration
// ============================================================================

/// Static vtable
static VTABLE: PixEditModuleVTable = PixEditModuleVTable {
    abi_version,
    module_info,
    edit,
};

/// Module entry point - returns the vtable
#[no_mangle]
pub extern "C" fn pixedit_module_register() -> *const PixEditModuleVTable {
    &VTABLE
}
