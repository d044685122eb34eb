//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::manifest::LinkType;

/// Top-level CLI entry point for the link lifecycle engine.
#[derive(Parser, Debug)]
#[command(
    name = "lnkr",
    about = "Move files to a remote directory and keep them linked into the project",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Manifest file to use instead of ./.lnkr.toml
    #[arg(short, long, global = true)]
    pub manifest: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update the manifest and link it from the remote directory
    Init(InitOpts),
    /// Move a path to the remote directory and link it back
    Add(AddOpts),
    /// Move a tracked path back from the remote directory
    Remove(PathOpts),
    /// Toggle or set the link type of a tracked path
    Switch(SwitchOpts),
    /// Create every link listed in the manifest
    Link,
    /// Remove every link listed in the manifest
    Unlink,
    /// Show the state of every link
    Status,
    /// Remove the manifest link and the git exclude section
    Clean,
    /// Print version information
    Version,
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InitOpts {
    /// Remote directory (relative values are placed under the remote root)
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Git exclude file to maintain (default: .git/info/exclude)
    #[arg(long)]
    pub git_exclude_path: Option<String>,
}

/// Options for the `add` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AddOpts {
    /// Path relative to the local root
    pub path: String,

    /// Add every file below a directory (hard links only)
    #[arg(short, long)]
    pub recursive: bool,

    /// Use a symbolic link
    #[arg(short, long, conflicts_with = "hard")]
    pub symbolic: bool,

    /// Use hard links
    #[arg(long)]
    pub hard: bool,
}

impl AddOpts {
    /// Link type requested on the command line, if any.
    #[must_use]
    pub const fn link_type(&self) -> Option<LinkType> {
        if self.hard {
            Some(LinkType::Hard)
        } else if self.symbolic {
            Some(LinkType::Symbolic)
        } else {
            None
        }
    }
}

/// Options naming a single tracked path.
#[derive(Parser, Debug, Clone)]
pub struct PathOpts {
    /// Path relative to the local root
    pub path: String,
}

/// Options for the `switch` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SwitchOpts {
    /// Path relative to the local root
    pub path: String,

    /// New link type (sym or hard); toggles when omitted
    pub link_type: Option<String>,
}
