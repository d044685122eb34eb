//! Link and unlink command implementations.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::engine::{self, BatchReport};
use crate::logging::Logger;

/// Run the link command: create every link listed in the manifest.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or every entry failed.
pub fn run_link(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let result = engine::create_links(&setup.ctx(log));
    finish(result, log, "Link summary").context("failed to create links")
}

/// Run the unlink command: remove every link listed in the manifest.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or every entry failed.
pub fn run_unlink(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let result = engine::unlink(&setup.ctx(log));
    finish(result, log, "Unlink summary").context("failed to remove links")
}

fn finish(result: crate::error::Result<BatchReport>, log: &Logger, title: &str) -> Result<()> {
    log.print_summary(title);
    let report = result?;
    if report.failed > 0 {
        log.warn(&format!("{} of {} entries failed", report.failed, report.total()));
    }
    Ok(())
}
