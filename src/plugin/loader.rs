/*
 *  plugin/loader.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Module loader - opens .so/.dll/.dylib files and checks the contract
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

use std::ffi::c_char;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use libloading::{Library, Symbol};

use crate::error::EditorError;
use crate::module::BoxedModule;
use crate::registry::ModuleProbe;
use super::adapter::PluginModule;
use super::ffi::{
    extract_string,
    PixEditModuleVTable,
    ModuleRegisterFn,
    PIXEDIT_MODULE_ABI_VERSION_MAJOR,
    PIXEDIT_MODULE_ABI_VERSION_MINOR,
    PIXEDIT_MODULE_ABI_VERSION_PATCH,
    PIXEDIT_MODULE_NAME_SIZE,
    PIXEDIT_MODULE_VERSION_SIZE,
    PIXEDIT_MODULE_REGISTER_SYMBOL,
};

/// Module metadata extracted from the library
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    /// Display name (e.g., "Blur")
    pub name: String,

    /// Module version (e.g., "1.0.0")
    pub version: String,

    /// ABI version (major, minor, patch)
    pub abi_version: (u32, u32, u32),

    /// File the module was loaded from
    pub path: PathBuf,
}

/// A loaded module with its library and vtable
pub struct LoadedPlugin {
    /// The loaded shared library (must be kept alive)
    #[allow(dead_code)]
    library: Library,

    /// Module vtable
    vtable: &'static PixEditModuleVTable,

    /// Module metadata
    metadata: ModuleMetadata,
}

impl LoadedPlugin {
    /// Get the module vtable
    pub fn vtable(&self) -> &'static PixEditModuleVTable {
        self.vtable
    }

    /// Get module metadata
    pub fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }
}

/// Module loader - opens editing module libraries
pub struct PluginLoader;

impl PluginLoader {
    /// Load a module from a specific path
    ///
    /// This performs the following steps:
    /// 1. Load the shared library
    /// 2. Get the registration function symbol
    /// 3. Call the registration function to get the vtable
    /// 4. Verify ABI version compatibility
    /// 5. Extract module metadata
    ///
    /// A library that cannot be opened is a `ModuleLoad` error; one that opens
    /// but fails any later step is `ModuleNotConforming`.
    pub fn load_plugin<P: AsRef<Path>>(path: P) -> Result<LoadedPlugin, EditorError> {
        let path = path.as_ref();
        info!("Loading module from: {}", path.display());

        let not_conforming = |reason: String| EditorError::ModuleNotConforming {
            path: path.to_path_buf(),
            reason,
        };

        // Load the shared library
        let library = unsafe {
            Library::new(path).map_err(|e| EditorError::ModuleLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        // Get the registration function
        let vtable_ptr = {
            let register_fn: Symbol<ModuleRegisterFn> = unsafe {
                library.get(PIXEDIT_MODULE_REGISTER_SYMBOL)
                    .map_err(|e| not_conforming(format!("missing registration function: {}", e)))?
            };
            register_fn()
        };

        if vtable_ptr.is_null() {
            return Err(not_conforming("registration returned null vtable".to_string()));
        }

        let vtable: &'static PixEditModuleVTable = unsafe { &*vtable_ptr };

        // Verify ABI version
        let mut major = 0u32;
        let mut minor = 0u32;
        let mut patch = 0u32;

        (vtable.abi_version)(&mut major, &mut minor, &mut patch);

        debug!("Module ABI version: {}.{}.{}", major, minor, patch);

        if major != PIXEDIT_MODULE_ABI_VERSION_MAJOR {
            return Err(not_conforming(format!(
                "ABI version mismatch: module {}.{}.{} incompatible with host {}.{}.{}",
                major, minor, patch,
                PIXEDIT_MODULE_ABI_VERSION_MAJOR,
                PIXEDIT_MODULE_ABI_VERSION_MINOR,
                PIXEDIT_MODULE_ABI_VERSION_PATCH
            )));
        }

        if minor > PIXEDIT_MODULE_ABI_VERSION_MINOR {
            warn!("Module has newer minor version {}.{}.{} than host {}.{}.{}",
                major, minor, patch,
                PIXEDIT_MODULE_ABI_VERSION_MAJOR,
                PIXEDIT_MODULE_ABI_VERSION_MINOR,
                PIXEDIT_MODULE_ABI_VERSION_PATCH
            );
        }

        // Extract module metadata
        let mut name_buf = vec![0 as c_char; PIXEDIT_MODULE_NAME_SIZE];
        let mut version_buf = vec![0 as c_char; PIXEDIT_MODULE_VERSION_SIZE];

        (vtable.module_info)(name_buf.as_mut_ptr(), version_buf.as_mut_ptr());

        let name = extract_string(&name_buf).trim().to_string();
        let version = extract_string(&version_buf);

        if name.is_empty() {
            return Err(not_conforming("module reported an empty name".to_string()));
        }

        info!("Loaded module: {} v{}", name, version);

        let metadata = ModuleMetadata {
            name,
            version,
            abi_version: (major, minor, patch),
            path: path.to_path_buf(),
        };

        Ok(LoadedPlugin {
            library,
            vtable,
            metadata,
        })
    }
}

/// Capability probe backed by `libloading`
///
/// Conformance failures are a normal outcome and come back as `Ok(None)`;
/// only a library that cannot be opened at all is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryProbe;

impl ModuleProbe for LibraryProbe {
    fn probe(&self, path: &Path) -> Result<Option<BoxedModule>, EditorError> {
        match PluginLoader::load_plugin(path) {
            Ok(plugin) => Ok(Some(Box::new(PluginModule::new(plugin)))),
            Err(EditorError::ModuleNotConforming { reason, .. }) => {
                warn!("bad plugin: {} ({})", path.display(), reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_garbage_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libgarbage.so");
        fs::write(&path, b"definitely not a shared object").unwrap();

        let result = PluginLoader::load_plugin(&path);
        assert!(matches!(result, Err(EditorError::ModuleLoad { .. })));

        let probed = LibraryProbe.probe(&path);
        assert!(matches!(probed, Err(EditorError::ModuleLoad { .. })));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PluginLoader::load_plugin(dir.path().join("libmissing.so"));
        assert!(matches!(result, Err(EditorError::ModuleLoad { .. })));
    }
}
