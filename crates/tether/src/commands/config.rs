//! Config command - print the effective configuration.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show which file the config was read from
    #[arg(long)]
    pub source: bool,
}

/// Print the configuration after file discovery and environment overrides.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let (config, source) = tether_config::load_config(ctx.config_path.as_deref())?;

    if args.source || ctx.verbose {
        match &source {
            Some(path) => println!("# Loaded from: {}", path.display()),
            None => println!("# No config file found, using defaults"),
        }
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
