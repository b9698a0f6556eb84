/*
 *  session.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Session state - displayed image, undo baseline, sibling navigation
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

use std::fs;
use std::path::{Path, PathBuf};
use image::RgbImage;
use log::{debug, info, warn};

use crate::buffer::{from_buffer, to_buffer, PixelBuffer};
use crate::error::EditorError;
use crate::registry::is_regular_file;

/// Raster formats accepted for open, save and navigation
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "bmp", "jpg"];

/// Editing state; `Editing` only exists while a module call is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Ready,
    Editing,
}

/// Sibling navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Enabled state of the previous/next controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationFlags {
    pub can_prev: bool,
    pub can_next: bool,
}

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// Loaded the neighbouring file
    Moved(PathBuf),
    /// Already at the first/last file; nothing changed
    AtBoundary,
}

/// Image currently on display plus its load-time snapshot
#[derive(Debug)]
pub struct Session {
    state: EditorState,
    current_path: Option<PathBuf>,
    baseline: Option<PixelBuffer>,
    displayed: Option<PixelBuffer>,
    navigation: NavigationFlags,
    file_size: u64,
    edited: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
            current_path: None,
            baseline: None,
            displayed: None,
            navigation: NavigationFlags::default(),
            file_size: 0,
            edited: false,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn displayed(&self) -> Option<&PixelBuffer> {
        self.displayed.as_ref()
    }

    pub fn baseline(&self) -> Option<&PixelBuffer> {
        self.baseline.as_ref()
    }

    pub fn navigation(&self) -> NavigationFlags {
        self.navigation
    }

    /// Displayable form of the current buffer
    pub fn displayed_image(&self) -> Option<RgbImage> {
        self.displayed.as_ref().map(from_buffer)
    }

    /// Decode `path` and make it the displayed image and undo baseline.
    ///
    /// On any failure the session is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), EditorError> {
        let decoded = image::open(path).map_err(|e| EditorError::ImageDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let buffer = to_buffer(&decoded)?;
        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        info!("Loaded {} ({}x{})", path.display(), buffer.width(), buffer.height());

        self.baseline = Some(buffer.clone());
        self.displayed = Some(buffer);
        self.current_path = Some(path.to_path_buf());
        self.file_size = file_size;
        self.edited = false;
        self.state = EditorState::Ready;
        self.refresh_navigation();
        Ok(())
    }

    /// Restore the load-time snapshot
    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.require_ready()?;
        let baseline = self.baseline.as_ref().ok_or(EditorError::NoImageLoaded)?;
        self.displayed = Some(baseline.clone());
        self.edited = false;
        debug!("Reverted to load-time snapshot");
        Ok(())
    }

    /// Load the previous or next supported image in the current directory.
    ///
    /// Neighbours that fail to decode are skipped with a warning. If every
    /// remaining file in that direction fails, the first failure is returned
    /// and the session is unchanged.
    pub fn navigate(&mut self, direction: Direction) -> Result<NavigateOutcome, EditorError> {
        self.require_ready()?;
        let current = self.current_path.clone().ok_or(EditorError::NoImageLoaded)?;
        let siblings = list_siblings(&current)?;

        let Some(index) = position_of(&siblings, &current) else {
            debug!("{} is not among its listed siblings", current.display());
            return Ok(NavigateOutcome::AtBoundary);
        };

        let candidates: Vec<&PathBuf> = match direction {
            Direction::Prev => siblings[..index].iter().rev().collect(),
            Direction::Next => siblings[index + 1..].iter().collect(),
        };

        if candidates.is_empty() {
            debug!("Navigation {:?} at boundary", direction);
            return Ok(NavigateOutcome::AtBoundary);
        }

        let mut first_error = None;
        for path in candidates {
            match self.load(path) {
                Ok(()) => return Ok(NavigateOutcome::Moved(path.clone())),
                Err(e @ (EditorError::ImageDecode { .. } | EditorError::UnsupportedFormat(_))) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(first_error.unwrap_or(EditorError::NoImageLoaded))
    }

    /// Encode the displayed buffer to `path`; format follows the extension
    pub fn save_as(&self, path: &Path) -> Result<(), EditorError> {
        self.require_ready()?;
        if !is_image_file(path) {
            return Err(EditorError::UnsupportedFormat(format!(
                "Save Error: bad format or filename: {}",
                path.display()
            )));
        }
        let buffer = self.displayed.as_ref().ok_or(EditorError::NoImageLoaded)?;
        from_buffer(buffer).save(path).map_err(|e| EditorError::ImageEncode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!("Saved {}", path.display());
        Ok(())
    }

    /// One-line description of the current state for the status sink
    pub fn status_summary(&self) -> String {
        let (Some(path), Some(buffer)) = (self.current_path.as_ref(), self.displayed.as_ref()) else {
            return "No image".to_string();
        };
        if self.edited {
            format!("(edited image), {}x{}", buffer.width(), buffer.height())
        } else {
            format!(
                "{}, {}x{}, {} Bytes",
                path.display(),
                buffer.width(),
                buffer.height(),
                self.file_size
            )
        }
    }

    /// Enter `Editing` and hand out a private copy of the displayed buffer
    pub(crate) fn begin_edit(&mut self) -> Result<PixelBuffer, EditorError> {
        self.require_ready()?;
        let buffer = self.displayed.clone().ok_or(EditorError::NoImageLoaded)?;
        self.state = EditorState::Editing;
        Ok(buffer)
    }

    /// Leave `Editing`, committing `result` when there is one
    pub(crate) fn finish_edit(&mut self, result: Option<PixelBuffer>) {
        if let Some(buffer) = result {
            self.displayed = Some(buffer);
            self.edited = true;
        }
        self.state = EditorState::Ready;
    }

    fn require_ready(&self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Ready => Ok(()),
            _ => Err(EditorError::NoImageLoaded),
        }
    }

    fn refresh_navigation(&mut self) {
        let Some(current) = self.current_path.as_ref() else {
            self.navigation = NavigationFlags::default();
            return;
        };
        self.navigation = match list_siblings(current) {
            Ok(siblings) => match position_of(&siblings, current) {
                Some(index) => NavigationFlags {
                    can_prev: index > 0,
                    can_next: index + 1 < siblings.len(),
                },
                None => NavigationFlags::default(),
            },
            Err(e) => {
                debug!("Cannot list siblings of {}: {}", current.display(), e);
                NavigationFlags::default()
            }
        };
    }
}

/// True if the extension is a supported raster format (ASCII case-insensitive)
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Supported images in the directory of `path`, sorted by file name
pub fn list_siblings(path: &Path) -> Result<Vec<PathBuf>, EditorError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let candidate = entry?.path();
        if is_image_file(&candidate) && is_regular_file(&candidate) {
            files.push(candidate);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn position_of(siblings: &[PathBuf], current: &Path) -> Option<usize> {
    let name = current.file_name()?;
    siblings.iter().position(|p| p.file_name() == Some(name))
}
