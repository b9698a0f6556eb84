/*
 *  dispatch.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Edit dispatcher - routes activations to registered modules
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

use log::{info, warn};

use crate::error::EditorError;
use crate::registry::ModuleRegistry;
use crate::session::{EditorState, Session};

/// Runs editing modules from a registry against a session
pub struct Dispatcher<'r> {
    registry: &'r ModuleRegistry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        self.registry
    }

    /// Apply module `name` to the displayed image.
    ///
    /// The module works on a copy. The session only changes when the module
    /// succeeds and its output has the input's dimensions; the undo baseline
    /// is never touched.
    pub fn perform(&self, session: &mut Session, name: &str) -> Result<(), EditorError> {
        if session.state() != EditorState::Ready {
            return Err(EditorError::NoImageLoaded);
        }

        let module = self.registry
            .get(name)
            .ok_or_else(|| EditorError::PluginNotFound(name.to_string()))?;

        let input = session.begin_edit()?;
        let (width, height) = input.dimensions();

        let output = match module.edit(input) {
            Ok(output) => output,
            Err(e) => {
                session.finish_edit(None);
                warn!("Module '{}' edit discarded: {}", name, e);
                return Err(e);
            }
        };

        if output.dimensions() != (width, height) {
            session.finish_edit(None);
            let error = EditorError::InvalidPluginOutput {
                expected_width: width,
                expected_height: height,
                actual_width: output.width(),
                actual_height: output.height(),
            };
            warn!("Module '{}' edit discarded: {}", name, error);
            return Err(error);
        }

        session.finish_edit(Some(output));
        info!("Applied '{}' to {}x{} image", name, width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::module::{BoxedModule, EditingModule};
    use crate::registry::DuplicatePolicy;
    use image::{Rgb, RgbImage};

    struct Brighten;

    impl EditingModule for Brighten {
        fn name(&self) -> &str {
            "Brighten"
        }

        fn edit(&self, mut buffer: PixelBuffer) -> Result<PixelBuffer, EditorError> {
            for y in 0..buffer.height() {
                for b in buffer.row_mut(y) {
                    *b = b.saturating_add(40);
                }
            }
            Ok(buffer)
        }
    }

    struct Crop;

    impl EditingModule for Crop {
        fn name(&self) -> &str {
            "Crop"
        }

        fn edit(&self, buffer: PixelBuffer) -> Result<PixelBuffer, EditorError> {
            PixelBuffer::new(buffer.width() / 2, buffer.height())
        }
    }

    struct Failing;

    impl EditingModule for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn edit(&self, _buffer: PixelBuffer) -> Result<PixelBuffer, EditorError> {
            Err(EditorError::ModuleFailed {
                name: "Failing".into(),
                reason: "refused".into(),
            })
        }
    }

    fn registry() -> ModuleRegistry {
        let modules: Vec<BoxedModule> = vec![Box::new(Brighten), Box::new(Crop), Box::new(Failing)];
        ModuleRegistry::from_modules(modules, DuplicatePolicy::Shadow).0
    }

    fn loaded_session(dir: &std::path::Path) -> Session {
        let path = dir.join("a.png");
        RgbImage::from_pixel(6, 4, Rgb([100, 100, 100])).save(&path).unwrap();
        let mut session = Session::new();
        session.load(&path).unwrap();
        session
    }

    #[test]
    fn test_perform_without_image() {
        let registry = registry();
        let dispatcher = Dispatcher::new(&registry);
        let mut session = Session::new();
        assert!(matches!(
            dispatcher.perform(&mut session, "Brighten"),
            Err(EditorError::NoImageLoaded)
        ));
        assert_eq!(session.state(), EditorState::Idle);
    }

    #[test]
    fn test_perform_unknown_module() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let dispatcher = Dispatcher::new(&registry);
        let mut session = loaded_session(dir.path());
        assert!(matches!(
            dispatcher.perform(&mut session, "Sepia"),
            Err(EditorError::PluginNotFound(_))
        ));
        assert_eq!(session.state(), EditorState::Ready);
    }

    #[test]
    fn test_perform_commits_and_keeps_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let dispatcher = Dispatcher::new(&registry);
        let mut session = loaded_session(dir.path());

        dispatcher.perform(&mut session, "Brighten").unwrap();
        assert_eq!(session.displayed().unwrap().pixel(0, 0), [140, 140, 140]);
        assert_eq!(session.baseline().unwrap().pixel(0, 0), [100, 100, 100]);
        assert_eq!(session.status_summary(), "(edited image), 6x4");

        // cumulative edits, single undo back to load time
        dispatcher.perform(&mut session, "Brighten").unwrap();
        assert_eq!(session.displayed().unwrap().pixel(0, 0), [180, 180, 180]);
        session.undo().unwrap();
        assert_eq!(session.displayed().unwrap().pixel(0, 0), [100, 100, 100]);
    }

    #[test]
    fn test_reshaped_output_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let dispatcher = Dispatcher::new(&registry);
        let mut session = loaded_session(dir.path());
        let before = session.displayed().unwrap().as_bytes().to_vec();

        let err = dispatcher.perform(&mut session, "Crop").unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidPluginOutput { expected_width: 6, actual_width: 3, .. }
        ));
        assert_eq!(session.displayed().unwrap().as_bytes(), before.as_slice());
        assert_eq!(session.state(), EditorState::Ready);
    }

    #[test]
    fn test_module_error_leaves_image() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let dispatcher = Dispatcher::new(&registry);
        let mut session = loaded_session(dir.path());
        let before = session.displayed().cloned();

        assert!(dispatcher.perform(&mut session, "Failing").is_err());
        assert_eq!(session.displayed().cloned(), before);
        assert_eq!(session.state(), EditorState::Ready);
    }
}
