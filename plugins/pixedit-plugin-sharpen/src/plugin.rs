/*
 *  pixedit Sharpen Module - Module Implementation
 *
 *  3x3 sharpening convolution over 8-bit RGB pixels
 */

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::ffi::*;

const CHANNELS: usize = 3;

/// Center-weighted Laplacian; weights sum to 1 so flat regions are preserved
const KERNEL: [[i32; 3]; 3] = [
    [0, -1, 0],
    [-1, 5, -1],
    [0, -1, 0],
];

/// Sharpen `src` into `dst`; both share `width`, `height` and `stride`.
/// Edge pixels reuse their nearest neighbour (aa|abcd|dd).
pub fn sharpen(src: &[u8], dst: &mut [u8], width: usize, height: usize, stride: usize) {
    let clamp_x = |x: isize| x.clamp(0, width as isize - 1) as usize;
    let clamp_y = |y: isize| y.clamp(0, height as isize - 1) as usize;

    for y in 0..height {
        for x in 0..width {
            for c in 0..CHANNELS {
                let mut acc = 0i32;
                for (ky, row) in KERNEL.iter().enumerate() {
                    let sy = clamp_y(y as isize + ky as isize - 1);
                    for (kx, &weight) in row.iter().enumerate() {
                        if weight == 0 {
                            continue;
                        }
                        let sx = clamp_x(x as isize + kx as isize - 1);
                        acc += weight * src[sy * stride + sx * CHANNELS + c] as i32;
                    }
                }
                dst[y * stride + x * CHANNELS + c] = acc.clamp(0, 255) as u8;
            }
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

extern "C" fn abi_version(major: *mut u32, minor: *mut u32, patch: *mut u32) {
    if !major.is_null() && !minor.is_null() && !patch.is_null() {
        unsafe {
            *major = PIXEDIT_MODULE_ABI_VERSION_MAJOR;
            *minor = PIXEDIT_MODULE_ABI_VERSION_MINOR;
            *patch = PIXEDIT_MODULE_ABI_VERSION_PATCH;
        }
    }
}

extern "C" fn module_info(name: *mut c_char, version: *mut c_char) {
    copy_str_to_buffer("Sharpen", name, PIXEDIT_MODULE_NAME_SIZE);
    copy_str_to_buffer(env!("CARGO_PKG_VERSION"), version, PIXEDIT_MODULE_VERSION_SIZE);
}

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
        log::debug!("Sharpen {}x{}", src.width, src.height);

        let src_bytes = unsafe { std::slice::from_raw_parts(src.data as *const u8, src.len) };
        let dst_bytes = unsafe { std::slice::from_raw_parts_mut(dst.data, dst.len) };

        sharpen(
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
