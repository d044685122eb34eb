//! Switch command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, SwitchOpts};
use crate::engine;
use crate::logging::Logger;

/// Run the switch command.
///
/// # Errors
///
/// Returns an error if the type is invalid, the path is not tracked or the
/// links cannot be replaced.
pub fn run(global: &GlobalOpts, opts: &SwitchOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    engine::switch(&setup.ctx(log), &opts.path, opts.link_type.as_deref())
        .with_context(|| format!("failed to switch {}", opts.path))?;
    Ok(())
}
