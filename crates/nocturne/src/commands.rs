//! Command execution.
//!
//! Every command writes its result to the given writer so the binary and
//! the tests share one code path.

use std::io::Write;

use anyhow::{Context, Result};
use nocturne_render::{
    hostname_of, load_settings, update_settings, AppearanceResolver, FileStore, MemoryPage,
    Resolution, ResolverConfig, ThemeSettings,
};

use crate::cli::{Cli, Command, ResolveArgs, SiteCommand};

/// Runs a parsed command line.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ResolverConfig::default(),
    };
    let store = FileStore::new(&cli.settings);
    let key = config.storage_key.as_str();

    match &cli.command {
        Command::Show => {
            let settings = load_settings(&store, key).context("failed to read settings")?;
            print_settings(out, &settings)?;
        }
        Command::Default { mode } => {
            let settings = update_settings(&store, key, |s| s.set_default_mode(*mode))
                .context("failed to update settings")?;
            tracing::debug!(mode = %mode, "default mode set");
            print_settings(out, &settings)?;
        }
        Command::Site(SiteCommand::Set { host, mode }) => {
            let settings = update_settings(&store, key, |s| match mode {
                Some(mode) => {
                    s.set_site_override(host, *mode);
                }
                None => {
                    s.enable_site(host);
                }
            })
            .context("failed to update settings")?;
            print_settings(out, &settings)?;
        }
        Command::Site(SiteCommand::Clear { host }) => {
            let mut removed = None;
            let settings = update_settings(&store, key, |s| {
                removed = s.clear_site_override(host);
            })
            .context("failed to update settings")?;
            if removed.is_none() {
                tracing::warn!(host = %host, "no override to clear");
            }
            print_settings(out, &settings)?;
        }
        Command::Resolve(args) => {
            let settings = load_settings(&store, key).context("failed to read settings")?;
            resolve(out, &settings, config, args)?;
        }
    }
    Ok(())
}

fn print_settings<W: Write>(out: &mut W, settings: &ThemeSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(&settings.to_value())?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn resolve<W: Write>(
    out: &mut W,
    settings: &ThemeSettings,
    config: ResolverConfig,
    args: &ResolveArgs,
) -> Result<()> {
    let mut page = MemoryPage::new(args.location.as_str());
    if let Some(color) = &args.body {
        page = page.with_body_background(color.as_str());
    }
    if let Some(color) = &args.root {
        page = page.with_root_background(color.as_str());
    }

    let mut resolver = AppearanceResolver::new(page, config).with_prefers_dark(args.prefers_dark);
    let resolution = resolver.settings_changed(&settings.to_value());

    if args.json {
        let report = serde_json::json!({
            "hostname": hostname_of(&args.location),
            "theme": resolution.applied(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    match resolution {
        Resolution::Inactive => writeln!(out, "inactive")?,
        Resolution::Active(_) => {
            for (name, value) in resolver.page().attributes() {
                writeln!(out, "{}=\"{}\"", name, value)?;
            }
            if args.css {
                writeln!(out)?;
                write!(out, "{}", resolver.stylesheet())?;
            }
        }
    }
    Ok(())
}
