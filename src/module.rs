/*
 *  module.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Core trait definition for editing modules
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

use crate::buffer::PixelBuffer;
use crate::error::EditorError;

/// Minimal editing abstraction - every plugin must implement this trait
///
/// A module is identified by its display name, which also labels the
/// activation control bound to it. `edit` receives an owned buffer and may
/// either mutate it in place and hand it back, or return a replacement.
/// The caller checks the returned shape before committing it.
pub trait EditingModule {
    /// Display name; must be non-empty
    fn name(&self) -> &str;

    /// Transform the buffer
    fn edit(&self, buffer: PixelBuffer) -> Result<PixelBuffer, EditorError>;

    /// Version string reported by the module, if any
    fn version(&self) -> &str {
        ""
    }
}

/// Boxed module as stored by the registry
pub type BoxedModule = Box<dyn EditingModule>;
