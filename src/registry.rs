/*
 *  registry.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Module registry - directory scan and name-keyed lookup
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

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};

use crate::error::EditorError;
use crate::module::{BoxedModule, EditingModule};

/// File extensions treated as dynamic module candidates
pub const MODULE_EXTENSIONS: [&str; 3] = ["so", "dll", "dylib"];

/// Capability query against the editing module contract
///
/// `Ok(Some(_))` is a conforming module, `Ok(None)` a file that loaded but
/// does not implement the contract, and `Err(_)` a file that could not be
/// loaded at all.
pub trait ModuleProbe {
    fn probe(&self, path: &Path) -> Result<Option<BoxedModule>, EditorError>;
}

/// What to do when two modules report the same display name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Later module wins the lookup; the earlier one stays loaded but unreachable
    #[default]
    Shadow,
    /// Later module is rejected at load time
    Reject,
}

/// A candidate file that did not make it into the registry
#[derive(Debug)]
pub struct Rejection {
    pub path: PathBuf,
    pub error: EditorError,
}

/// Outcome of a directory scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Candidate files in scan order
    pub candidates: Vec<PathBuf>,
    /// Names accepted, in scan order
    pub accepted: Vec<String>,
    /// Names whose earlier registration was shadowed
    pub shadowed: Vec<String>,
    pub rejected: Vec<Rejection>,
}

/// Ordered, name-keyed table of accepted editing modules
///
/// Built once and never mutated afterwards; hand it to the dispatcher by
/// reference.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<BoxedModule>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry over already constructed modules, in the given order.
    ///
    /// Returns the registry plus any modules refused by `policy`.
    pub fn from_modules(
        modules: Vec<BoxedModule>,
        policy: DuplicatePolicy,
    ) -> (Self, Vec<Rejection>) {
        let mut registry = Self::empty();
        let mut rejected = Vec::new();
        for module in modules {
            let path = PathBuf::from(format!("<builtin:{}>", module.name()));
            match registry.insert(module, policy) {
                Ok(_) => {}
                Err(name) => rejected.push(Rejection {
                    error: EditorError::DuplicateModule { name, path: path.clone() },
                    path,
                }),
            }
        }
        (registry, rejected)
    }

    /// Scan `dir` for module files and probe each one.
    ///
    /// Never fails: an unreadable directory gives an empty registry, and
    /// every bad candidate is logged and recorded in the report.
    pub fn scan(dir: &Path, probe: &dyn ModuleProbe, policy: DuplicatePolicy) -> (Self, ScanReport) {
        let mut registry = Self::empty();
        let mut report = ScanReport::default();

        report.candidates = match discover_candidates(dir) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Cannot read plugins directory {}: {}", dir.display(), e);
                return (registry, report);
            }
        };

        debug!("Found {} module candidates in {}", report.candidates.len(), dir.display());

        for path in &report.candidates {
            let module = match probe.probe(path) {
                Ok(Some(module)) => module,
                Ok(None) => {
                    warn!("bad plugin: {}", path.display());
                    report.rejected.push(Rejection {
                        path: path.clone(),
                        error: EditorError::ModuleNotConforming {
                            path: path.clone(),
                            reason: "does not implement the editing module contract".to_string(),
                        },
                    });
                    continue;
                }
                Err(e) => {
                    warn!("{}", e);
                    report.rejected.push(Rejection { path: path.clone(), error: e });
                    continue;
                }
            };

            let name = module.name().to_string();
            if name.is_empty() {
                warn!("bad plugin: {} (empty name)", path.display());
                report.rejected.push(Rejection {
                    path: path.clone(),
                    error: EditorError::ModuleNotConforming {
                        path: path.clone(),
                        reason: "empty module name".to_string(),
                    },
                });
                continue;
            }

            match registry.insert(module, policy) {
                Ok(shadowed) => {
                    info!("Registered module '{}' from {}", name, path.display());
                    if shadowed {
                        report.shadowed.push(name.clone());
                    }
                    report.accepted.push(name);
                }
                Err(name) => {
                    let error = EditorError::DuplicateModule { name, path: path.clone() };
                    warn!("{}", error);
                    report.rejected.push(Rejection { path: path.clone(), error });
                }
            }
        }

        (registry, report)
    }

    /// Append a module; Ok(true) when it shadows an earlier entry,
    /// Err(name) when the policy refuses the duplicate.
    fn insert(&mut self, module: BoxedModule, policy: DuplicatePolicy) -> Result<bool, String> {
        let name = module.name().to_string();
        let shadowed = self.index.contains_key(&name);
        if shadowed {
            match policy {
                DuplicatePolicy::Reject => return Err(name),
                DuplicatePolicy::Shadow => {
                    warn!("Module '{}' shadows an earlier module with the same name", name);
                }
            }
        }
        self.modules.push(module);
        self.index.insert(name, self.modules.len() - 1);
        Ok(shadowed)
    }

    /// Look a module up by display name
    pub fn get(&self, name: &str) -> Option<&dyn EditingModule> {
        self.index.get(name).map(|&i| self.modules[i].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Reachable action names, in first registration order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for module in &self.modules {
            let name = module.name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Every accepted module in scan order, shadowed ones included
    pub fn iter(&self) -> impl Iterator<Item = &dyn EditingModule> {
        self.modules.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// True if the file name carries one of `MODULE_EXTENSIONS`
pub fn is_module_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MODULE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Regular file, or a symlink resolving to one (`libfoo.so -> libfoo.so.1`)
pub(crate) fn is_regular_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Regular files in `dir` with a module extension, sorted by file name
pub fn discover_candidates(dir: &Path) -> Result<Vec<PathBuf>, EditorError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_module_file(&path) && is_regular_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
