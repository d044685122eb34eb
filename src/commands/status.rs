//! Status command implementation.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::engine;
use crate::logging::Logger;
use crate::manifest::MANIFEST_FILE_NAME;

/// Run the status command and print one row per manifest entry.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or its roots cannot be
/// resolved.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let rows = engine::status(&setup.ctx(log)).context("failed to read link status")?;
    if rows.is_empty() {
        log.info(&format!("No links found in {MANIFEST_FILE_NAME}"));
        return Ok(());
    }
    for line in engine::render_table(&rows) {
        log.info(&line);
    }
    let broken = rows.iter().filter(|r| !r.state.is_linked()).count();
    if broken > 0 {
        log.warn(&format!("{broken} of {} links need attention", rows.len()));
    }
    Ok(())
}
