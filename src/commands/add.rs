//! Add command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{AddOpts, GlobalOpts};
use crate::engine::{self, AddOutcome};
use crate::logging::Logger;

/// Run the add command.
///
/// # Errors
///
/// Returns an error if the path cannot be moved, linked or recorded.
pub fn run(global: &GlobalOpts, opts: &AddOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let outcome = engine::add(&setup.ctx(log), &opts.path, opts.recursive, opts.link_type())
        .with_context(|| format!("failed to add {}", opts.path))?;
    if let AddOutcome::Added(entries) = outcome {
        log.debug(&format!("{} entries added", entries.len()));
    }
    Ok(())
}
