/*
 *  main.rs
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

use std::fs::File;
use std::io::{self, BufReader};
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use pixedit::config::{self, Cli};
use pixedit::registry::{ModuleRegistry, ScanReport};
use pixedit::shell::{Command, Shell};
use pixedit::status::WriterSink;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[cfg(feature = "plugin-system")]
fn build_registry(cfg: &config::Config) -> (ModuleRegistry, ScanReport) {
    use pixedit::plugin::LibraryProbe;

    let dir = cfg.plugins_dir();
    info!("Scanning for editing modules in {}", dir.display());
    ModuleRegistry::scan(&dir, &LibraryProbe, cfg.duplicate_policy())
}

#[cfg(not(feature = "plugin-system"))]
fn build_registry(_cfg: &config::Config) -> (ModuleRegistry, ScanReport) {
    warn!("Built without plugin-system; no editing modules available");
    (ModuleRegistry::empty(), ScanReport::default())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        return Ok(());
    }

    // Initialize the logger with the configured level
    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    // modules are loaded once, before any session exists
    let (registry, report) = build_registry(&cfg);
    info!(
        "{} editing modules registered, {} rejected",
        report.accepted.len(),
        report.rejected.len()
    );
    for rejection in &report.rejected {
        warn!("Skipped {}: {}", rejection.path.display(), rejection.error);
    }

    let mut shell = Shell::new(&registry, WriterSink::new(io::stdout()));

    if let Some(image) = cli.image.clone() {
        shell.execute(Command::Open(image));
    }

    match cli.script.as_ref() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            shell.run(BufReader::new(file))?;
        }
        None => shell.run(io::stdin().lock())?,
    }

    info!("Bye");
    Ok(())
}
