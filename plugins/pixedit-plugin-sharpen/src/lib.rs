/*
 *  pixedit Sharpen Module
 *
 *  A dynamic editing module for pixedit that applies a 3x3
 *  sharpening kernel to the displayed image.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # pixedit Sharpen Module
//!
//! Laplacian sharpen with replicated borders. Registers as "Sharpen".

mod ffi;
mod plugin;

// Re-export the module registration function
pub use plugin::pixedit_module_register;
