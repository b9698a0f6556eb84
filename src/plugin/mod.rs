/*
 *  plugin/mod.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Dynamic module system for editing plugins
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

//! Dynamic module system for pixedit editing plugins
//!
//! Editing modules ship as shared libraries (.so/.dll/.dylib) that are
//! opened once at startup. Each accepted module contributes one named
//! edit action.
//!
//! ## Architecture
//!
//! The module system consists of three layers:
//!
//! 1. **FFI Layer** (`ffi.rs`) - C ABI types for a stable module interface
//! 2. **Loader** (`loader.rs`) - Opens libraries and checks the contract
//! 3. **Adapter** (`adapter.rs`) - Wraps C ABI modules as `EditingModule`
//!
//! ## Module Discovery
//!
//! The plugins directory is resolved in priority order:
//!
//! 1. `--plugins-dir` on the command line
//! 2. `plugins.dir` in the config file
//! 3. `$PIXEDIT_PLUGIN_PATH` (environment variable)
//! 4. `plugins/` next to the executable
//!
//! ## Module Naming
//!
//! Any file name works; only the extension is checked:
//!
//! - Linux: `libpixedit_blur.so`
//! - macOS: `libpixedit_blur.dylib`
//! - Windows: `pixedit_blur.dll`

pub mod ffi;
pub mod loader;
pub mod adapter;

// Re-exports for convenience
pub use ffi::{
    PixEditModuleVTable,
    PixEditErrorCode,
    PixEditError,
    PixEditImage,
};

pub use loader::{PluginLoader, LoadedPlugin, LibraryProbe, ModuleMetadata};
pub use adapter::PluginModule;
