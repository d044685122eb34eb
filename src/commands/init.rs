//! Init command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, InitOpts};
use crate::engine::{self, InitOptions};
use crate::logging::Logger;

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the remote root is missing or the manifest cannot be
/// created, linked or saved.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let options = InitOptions {
        remote: opts.remote.clone(),
        git_exclude_path: opts.git_exclude_path.clone(),
    };
    engine::init(&setup.ctx(log), setup.manifest_file(), &setup.cwd, &options)
        .context("failed to initialize project")
}
