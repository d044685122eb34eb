//! Clean command implementation.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::engine;
use crate::logging::Logger;

/// Run the clean command.
///
/// # Errors
///
/// Returns an error if the exclude file or manifest link cannot be removed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let outcome = engine::clean(&setup.ctx(log), setup.manifest_file()).context("failed to clean up")?;
    if !outcome.manifest_removed && !outcome.exclusions_removed {
        log.info("Nothing to clean.");
    }
    Ok(())
}
