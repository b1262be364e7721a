use clap::Parser;
use color_eyre::Result;
use crudbook::cli::{Cli, Outcome};
use crudbook::{Config, Profile, Store};
use tracing_subscriber::{EnvFilter, prelude::*, reload};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev selects separate config/data directories and verbose logging
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // CRUDBOOK_LOG wins over any filter; until the config is read the
    // profile default applies. Logs go to stderr.
    let env_filter = EnvFilter::try_from_env("CRUDBOOK_LOG").ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(Config::default_log_filter(profile))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(&crudbook::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    if !from_env {
        filter_handle.reload(EnvFilter::new(config.log_filter(profile)))?;
    }

    let variant = cli.app.unwrap_or(config.default_app);
    let store = Store::new(config.get_database_path(profile, variant)?);
    tracing::debug!(%variant, path = %store.path().display(), "using store");

    match crudbook::cli::handle_command(variant, store, cli.command)? {
        Outcome::Accepted => Ok(()),
        Outcome::Rejected => std::process::exit(1),
    }
}
