//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nocturne_render::ThemeMode;

/// Manage per-site light/dark settings and preview how a page resolves.
#[derive(Debug, Parser)]
#[command(name = "nocturne", version)]
#[command(about = "Manage per-site light/dark settings and preview theme resolution")]
pub struct Cli {
    /// Settings file (a JSON object keyed by storage key)
    #[arg(
        long,
        global = true,
        env = "NOCTURNE_SETTINGS",
        default_value = "nocturne-settings.json"
    )]
    pub settings: PathBuf,

    /// Resolver configuration (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the normalized settings
    Show,

    /// Set the mode newly enabled sites start with
    Default {
        /// light, dark or system
        mode: ThemeMode,
    },

    /// Manage per-site overrides
    #[command(subcommand)]
    Site(SiteCommand),

    /// Resolve a location against an in-memory page
    Resolve(ResolveArgs),
}

#[derive(Debug, Subcommand)]
pub enum SiteCommand {
    /// Add or replace a site override
    Set {
        /// Hostname, e.g. example.com
        host: String,
        /// light, dark or system (defaults to the default mode)
        mode: Option<ThemeMode>,
    },

    /// Remove a site override
    Clear {
        /// Hostname, e.g. example.com
        host: String,
    },
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Page URL or bare hostname
    pub location: String,

    /// Computed body background, e.g. "rgb(255, 255, 255)"
    #[arg(long, value_name = "COLOR")]
    pub body: Option<String>,

    /// Computed root background
    #[arg(long, value_name = "COLOR")]
    pub root: Option<String>,

    /// Pretend the OS prefers a dark scheme
    #[arg(long)]
    pub prefers_dark: bool,

    /// Also print the injected stylesheet
    #[arg(long)]
    pub css: bool,

    /// Print the decision as JSON instead of attributes
    #[arg(long, conflicts_with = "css")]
    pub json: bool,
}
