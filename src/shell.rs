/*
 *  shell.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Command shell - turns text lines into activation events
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

use std::io::BufRead;
use std::path::PathBuf;
use log::debug;

use crate::dispatch::Dispatcher;
use crate::registry::ModuleRegistry;
use crate::session::{Direction, NavigateOutcome, Session};
use crate::status::StatusSink;

const HELP: &str = "\
open <path>    load an image (png, bmp, jpg)
run <module>   apply an editing module
undo           revert to the image as loaded
prev | next    neighbouring image in the same directory
save <path>    write the displayed image
modules        list editing modules
status         show the current image
quit           leave";

/// One activation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Run(String),
    Undo,
    Prev,
    Next,
    Save(PathBuf),
    Modules,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let needs_arg = |what: &str| {
        if rest.is_empty() {
            Err(format!("{} needs {}", word, what))
        } else {
            Ok(rest.to_string())
        }
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "open" => Command::Open(PathBuf::from(needs_arg("a path")?)),
        "run" => Command::Run(needs_arg("a module name")?),
        "undo" => Command::Undo,
        "prev" => Command::Prev,
        "next" => Command::Next,
        "save" => Command::Save(PathBuf::from(needs_arg("a path")?)),
        "modules" => Command::Modules,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(Some(command))
}

/// Drives a session from commands and reports through a status sink
pub struct Shell<'r, S: StatusSink> {
    dispatcher: Dispatcher<'r>,
    session: Session,
    sink: S,
}

impl<'r, S: StatusSink> Shell<'r, S> {
    pub fn new(registry: &'r ModuleRegistry, sink: S) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            session: Session::new(),
            sink,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Execute one command; false once the shell should stop
    pub fn execute(&mut self, command: Command) -> bool {
        debug!("Command: {:?}", command);
        let result = match command {
            Command::Open(path) => self.session.load(&path),
            Command::Run(name) => self.dispatcher.perform(&mut self.session, &name),
            Command::Undo => self.session.undo(),
            Command::Prev => self.navigate(Direction::Prev),
            Command::Next => self.navigate(Direction::Next),
            Command::Save(path) => self.session.save_as(&path).map(|_| {
                self.sink.notify(&format!("Saved {}", path.display()));
            }),
            Command::Modules => {
                self.list_modules();
                return true;
            }
            Command::Status => Ok(()),
            Command::Help => {
                self.sink.notify(HELP);
                return true;
            }
            Command::Quit => return false,
        };

        match result {
            Ok(()) => self.sink.status(&self.session.status_summary()),
            Err(e) => self.sink.notify(&e.to_string()),
        }
        true
    }

    /// Read commands until end of input or `quit`
    pub fn run<R: BufRead>(&mut self, input: R) -> std::io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match parse_line(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => self.sink.notify(&message),
            }
        }
        Ok(())
    }

    fn navigate(&mut self, direction: Direction) -> Result<(), crate::error::EditorError> {
        if let NavigateOutcome::AtBoundary = self.session.navigate(direction)? {
            let message = match direction {
                Direction::Prev => "Current image is the first one.",
                Direction::Next => "Current image is the last one.",
            };
            self.sink.notify(message);
        }
        Ok(())
    }

    fn list_modules(&mut self) {
        let registry = self.dispatcher.registry();
        if registry.is_empty() {
            self.sink.notify("No editing modules loaded");
            return;
        }
        for name in registry.names() {
            self.sink.status(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RecordingSink;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  "), Ok(None));
        assert_eq!(parse_line("# comment"), Ok(None));
        assert_eq!(
            parse_line("run Gaussian Blur"),
            Ok(Some(Command::Run("Gaussian Blur".to_string())))
        );
        assert_eq!(
            parse_line("OPEN /tmp/a b.png"),
            Ok(Some(Command::Open(PathBuf::from("/tmp/a b.png"))))
        );
        assert_eq!(parse_line("next"), Ok(Some(Command::Next)));
        assert!(parse_line("save").is_err());
        assert!(parse_line("zoom in").is_err());
    }

    #[test]
    fn test_run_reports_failures_without_stopping() {
        let registry = ModuleRegistry::empty();
        let mut shell = Shell::new(&registry, RecordingSink::default());
        let script = "run Blur\nbogus\nundo\nmodules\nquit\nstatus\n";
        shell.run(script.as_bytes()).unwrap();

        let sink = shell.sink();
        assert_eq!(
            sink.notifications,
            vec![
                "No image to edit".to_string(),
                "Unknown command: bogus".to_string(),
                "No image to edit".to_string(),
                "No editing modules loaded".to_string(),
            ]
        );
        // nothing after quit ran
        assert!(sink.statuses.is_empty());
    }
}
