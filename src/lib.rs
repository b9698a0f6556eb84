/*
 *  lib.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
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

//! Editing core: pixel buffers, editing modules loaded at runtime, and the
//! session they operate on.

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod module;
pub mod registry;
pub mod session;
pub mod shell;
pub mod status;

// Dynamic modules (conditionally compiled with plugin-system feature)
#[cfg(feature = "plugin-system")]
pub mod plugin;

// Re-exports for convenience
pub use buffer::{from_buffer, to_buffer, PixelBuffer};
pub use dispatch::Dispatcher;
pub use error::EditorError;
pub use module::{BoxedModule, EditingModule};
pub use registry::{DuplicatePolicy, ModuleProbe, ModuleRegistry, ScanReport};
pub use session::{Direction, EditorState, NavigateOutcome, NavigationFlags, Session};
