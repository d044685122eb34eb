//! Remove command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, PathOpts};
use crate::engine;
use crate::logging::Logger;

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if a matched entry cannot be restored.
pub fn run(global: &GlobalOpts, opts: &PathOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    engine::remove(&setup.ctx(log), &opts.path)
        .with_context(|| format!("failed to remove {}", opts.path))?;
    Ok(())
}
