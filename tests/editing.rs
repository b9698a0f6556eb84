/*
 *  tests/editing.rs
 *
 *  End to end editing scenarios: load, dispatch, undo, navigate, save
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 */

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use pixedit::registry::{ModuleRegistry, ModuleProbe};
use pixedit::shell::Shell;
use pixedit::status::RecordingSink;
use pixedit::{
    BoxedModule, Direction, Dispatcher, DuplicatePolicy, EditingModule, EditorError,
    EditorState, NavigateOutcome, PixelBuffer, Session,
};

/// 3x3 mean filter, same shape out
struct MeanBlur;

impl EditingModule for MeanBlur {
    fn name(&self) -> &str {
        "Blur"
    }

    fn edit(&self, buffer: PixelBuffer) -> Result<PixelBuffer, EditorError> {
        let (w, h) = buffer.dimensions();
        let mut out = buffer.clone();
        for y in 0..h {
            for x in 0..w {
                let mut acc = [0u32; 3];
                let mut n = 0u32;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (sx, sy) = (x as i64 + dx, y as i64 + dy);
                        if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
                            continue;
                        }
                        let p = buffer.pixel(sx as u32, sy as u32);
                        for c in 0..3 {
                            acc[c] += p[c] as u32;
                        }
                        n += 1;
                    }
                }
                out.put_pixel(x, y, [
                    (acc[0] / n) as u8,
                    (acc[1] / n) as u8,
                    (acc[2] / n) as u8,
                ]);
            }
        }
        Ok(out)
    }
}

/// Returns a buffer half the size
struct Shrink;

impl EditingModule for Shrink {
    fn name(&self) -> &str {
        "Shrink"
    }

    fn edit(&self, buffer: PixelBuffer) -> Result<PixelBuffer, EditorError> {
        PixelBuffer::new(buffer.width() / 2, buffer.height() / 2)
    }
}

/// Stem based probe: `blur*` conforms, `foreign*` loads but does not conform,
/// anything else fails to load.
struct StemProbe;

impl ModuleProbe for StemProbe {
    fn probe(&self, path: &Path) -> Result<Option<BoxedModule>, EditorError> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if stem.starts_with("blur") {
            Ok(Some(Box::new(MeanBlur)))
        } else if stem.starts_with("foreign") {
            Ok(None)
        } else {
            Err(EditorError::ModuleLoad {
                path: path.to_path_buf(),
                reason: "invalid ELF header".to_string(),
            })
        }
    }
}

/// Checkerboard-ish gradient so blurring always changes something
fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let image = RgbImage::from_fn(width, height, |x, y| {
        if (x / 5 + y / 5) % 2 == 0 {
            Rgb([250, (x * 2) as u8, 10])
        } else {
            Rgb([5, 120, (y * 4) as u8])
        }
    });
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

fn registry_with(modules: Vec<BoxedModule>) -> ModuleRegistry {
    let (registry, rejected) = ModuleRegistry::from_modules(modules, DuplicatePolicy::Shadow);
    assert!(rejected.is_empty());
    registry
}

#[test]
fn test_blur_then_undo_restores_load_time_pixels() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "a.png", 100, 50);

    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let dispatcher = Dispatcher::new(&registry);
    let mut session = Session::new();

    session.load(&path).unwrap();
    let loaded = session.displayed().unwrap().clone();
    assert_eq!(loaded.dimensions(), (100, 50));

    dispatcher.perform(&mut session, "Blur").unwrap();
    let blurred = session.displayed().unwrap();
    assert_eq!(blurred.dimensions(), (100, 50));
    assert_ne!(blurred.as_bytes(), loaded.as_bytes());
    assert_eq!(session.status_summary(), "(edited image), 100x50");

    session.undo().unwrap();
    assert_eq!(session.displayed().unwrap().as_bytes(), loaded.as_bytes());
    assert_eq!(session.state(), EditorState::Ready);
    assert!(session.status_summary().contains("a.png, 100x50, "));
}

#[test]
fn test_edits_compose_on_displayed_buffer() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "a.png", 40, 30);

    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let dispatcher = Dispatcher::new(&registry);
    let mut session = Session::new();
    session.load(&path).unwrap();

    dispatcher.perform(&mut session, "Blur").unwrap();
    let once = session.displayed().unwrap().clone();
    dispatcher.perform(&mut session, "Blur").unwrap();
    let twice = session.displayed().unwrap().clone();
    assert_ne!(once.as_bytes(), twice.as_bytes());

    // undo goes straight back to the file, not to the first blur
    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.displayed(), session.baseline());
}

#[test]
fn test_reshaped_output_is_not_committed() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "a.png", 20, 10);

    let registry = registry_with(vec![Box::new(Shrink)]);
    let dispatcher = Dispatcher::new(&registry);
    let mut session = Session::new();
    session.load(&path).unwrap();
    let before = session.displayed().unwrap().clone();

    let err = dispatcher.perform(&mut session, "Shrink").unwrap_err();
    assert!(matches!(
        err,
        EditorError::InvalidPluginOutput { actual_width: 10, actual_height: 5, .. }
    ));
    assert_eq!(session.displayed().unwrap().as_bytes(), before.as_bytes());
    assert_eq!(session.state(), EditorState::Ready);
}

#[test]
fn test_next_walks_directory_then_stops() {
    let dir = TempDir::new().unwrap();
    let names = ["a.png", "b.bmp", "c.jpg", "d.png"];
    for name in names {
        write_png(dir.path(), name, 8, 8);
    }
    fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut session = Session::new();
    session.load(&dir.path().join("a.png")).unwrap();
    assert!(!session.navigation().can_prev);
    assert!(session.navigation().can_next);

    for expected in &names[1..] {
        match session.navigate(Direction::Next).unwrap() {
            NavigateOutcome::Moved(path) => {
                assert_eq!(path.file_name().unwrap(), *expected);
            }
            NavigateOutcome::AtBoundary => panic!("stopped early before {}", expected),
        }
    }

    let last = session.displayed().unwrap().clone();
    assert_eq!(session.navigate(Direction::Next).unwrap(), NavigateOutcome::AtBoundary);
    assert_eq!(session.current_path().unwrap().file_name().unwrap(), "d.png");
    assert_eq!(session.displayed().unwrap(), &last);
    assert!(!session.navigation().can_next);
    assert!(session.navigation().can_prev);
}

#[test]
fn test_navigation_resets_undo_baseline() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "a.png", 12, 12);
    let b = write_png(dir.path(), "b.png", 16, 9);

    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let dispatcher = Dispatcher::new(&registry);
    let mut session = Session::new();
    session.load(&dir.path().join("a.png")).unwrap();
    dispatcher.perform(&mut session, "Blur").unwrap();

    session.navigate(Direction::Next).unwrap();
    session.undo().unwrap();

    let expected = image::open(&b).unwrap().to_rgb8();
    assert_eq!(session.displayed_image().unwrap(), expected);
}

#[test]
fn test_scan_skips_bad_candidates() {
    let dir = TempDir::new().unwrap();
    for name in ["blur.so", "broken.so", "foreign.dll", "readme.txt"] {
        fs::write(dir.path().join(name), b"\x7fELF").unwrap();
    }

    let (registry, report) =
        ModuleRegistry::scan(dir.path(), &StemProbe, DuplicatePolicy::Shadow);

    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.accepted, vec!["Blur".to_string()]);
    assert_eq!(report.rejected.len(), 2);
    assert!(report.rejected.iter().all(|r| r.error.is_load_time()));
    assert_eq!(registry.names(), vec!["Blur"]);

    // a working dispatcher comes out of a partly broken directory
    let img_dir = TempDir::new().unwrap();
    let path = write_png(img_dir.path(), "a.png", 10, 10);
    let mut session = Session::new();
    session.load(&path).unwrap();
    Dispatcher::new(&registry).perform(&mut session, "Blur").unwrap();
}

#[test]
fn test_unknown_module_and_no_image() {
    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let dispatcher = Dispatcher::new(&registry);
    let mut session = Session::new();

    assert!(matches!(
        dispatcher.perform(&mut session, "Blur"),
        Err(EditorError::NoImageLoaded)
    ));
    assert_eq!(session.state(), EditorState::Idle);

    let dir = TempDir::new().unwrap();
    session.load(&write_png(dir.path(), "a.png", 4, 4)).unwrap();
    assert!(matches!(
        dispatcher.perform(&mut session, "Emboss"),
        Err(EditorError::PluginNotFound(name)) if name == "Emboss"
    ));
}

#[test]
fn test_save_as_round_trips_edited_pixels() {
    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "a.png", 30, 20);

    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let mut session = Session::new();
    session.load(&path).unwrap();
    Dispatcher::new(&registry).perform(&mut session, "Blur").unwrap();

    let target = dir.path().join("out.png");
    session.save_as(&target).unwrap();
    let saved = image::open(&target).unwrap().to_rgb8();
    assert_eq!(saved, session.displayed_image().unwrap());

    assert!(matches!(
        session.save_as(&dir.path().join("out.gif")),
        Err(EditorError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_shell_script() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "a.png", 10, 6);
    write_png(dir.path(), "b.png", 10, 6);

    let registry = registry_with(vec![Box::new(MeanBlur)]);
    let mut shell = Shell::new(&registry, RecordingSink::default());

    let script = format!(
        "# demo\nrun Blur\nopen {}\nrun Blur\nundo\nnext\nnext\nprev\nmodules\nbogus\nquit\nrun Blur\n",
        dir.path().join("a.png").display()
    );
    shell.run(Cursor::new(script)).unwrap();

    let sink = shell.sink();
    assert_eq!(
        sink.notifications,
        vec![
            "No image to edit".to_string(),
            "Current image is the last one.".to_string(),
            "Unknown command: bogus".to_string(),
        ]
    );
    assert_eq!(sink.statuses[1], "(edited image), 10x6");
    assert!(sink.statuses.contains(&"Blur".to_string()));
    assert_eq!(shell.session().current_path().unwrap().file_name().unwrap(), "a.png");
    assert_eq!(shell.session().displayed(), shell.session().baseline());
}
