//! # nocturne - per-site theme settings from the command line
//!
//! A thin front end over [`nocturne_render`]: it edits the settings blob in
//! a [`FileStore`](nocturne_render::FileStore) the same way a browser UI
//! would (read, modify, write the whole blob) and previews the resolver's
//! decision for a location and a pair of background colors.
//!
//! ```text
//! $ nocturne site set example.com dark
//! $ nocturne resolve https://example.com/ --body "rgb(255, 255, 255)"
//! data-nocturne-invert="true"
//! data-nocturne-scheme="dark"
//! ```

mod cli;
mod commands;

pub use cli::{Cli, Command, ResolveArgs, SiteCommand};
pub use commands::run;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. Falls back to `RUST_LOG`.
pub const LOG_ENV: &str = "NOCTURNE_LOG";

/// Installs the stderr log subscriber.
///
/// `verbose` overrides the environment and logs at `debug`. Installing
/// twice is a no-op.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
