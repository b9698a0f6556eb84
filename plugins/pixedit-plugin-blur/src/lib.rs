/*
 *  pixedit Blur Module
 *
 *  A dynamic editing module for pixedit that applies a normalized
 *  box filter to the displayed image.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # pixedit Blur Module
//!
//! 8x8 box blur with reflected borders. Registers as "Blur".
//!
//! ## Usage
//!
//! Copy `libpixedit_blur.so` (or the platform equivalent) into the
//! pixedit plugins directory and run:
//!
//! ```text
//! run Blur
//! ```

mod ffi;
mod plugin;

// Re-export the module registration function
pub use plugin::pixedit_module_register;
