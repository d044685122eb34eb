//! Command: print version information.

/// Version string: the build-time `LNKR_VERSION`, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("LNKR_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the lnkr version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("lnkr {}", version());
}
