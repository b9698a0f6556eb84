/*
 *  status.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  Status sinks - where state summaries and notifications end up
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

use std::io::Write;

/// Receives a summary after each state change and short user notifications
pub trait StatusSink {
    fn status(&mut self, summary: &str);
    fn notify(&mut self, message: &str);
}

/// Writes to any `io::Write`, one line per message
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for WriterSink<W> {
    fn status(&mut self, summary: &str) {
        // write errors are ignored
        let _ = writeln!(self.out, "{}", summary);
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.out, "! {}", message);
    }
}

/// Keeps everything in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub statuses: Vec<String>,
    pub notifications: Vec<String>,
}

impl StatusSink for RecordingSink {
    fn status(&mut self, summary: &str) {
        self.statuses.push(summary.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
