use clap::Parser;
use config::Config;
use std::path::PathBuf;

mod backup;
mod cli;
mod commands;
mod config;
mod report;
mod retention;
mod secrets;
mod session;

fn setup_logger() -> eyre::Result<()> {
    use tracing::Level;
    use tracing_subscriber::{
        filter::LevelFilter, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, Registry,
    };

    Registry::default()
        .with(LevelFilter::from(Level::INFO))
        .with(layer().with_ansi(true).with_target(false).without_time())
        .try_init()?;
    Ok(())
}

fn default_config_path() -> eyre::Result<PathBuf> {
    dirs_next::config_dir()
        .map(|dir| dir.join("rosbak").join("config.toml"))
        .ok_or_else(|| eyre::eyre!("failed to get default config file path"))
}

fn load_config(
    config_string: Option<&str>,
    config_file: Option<PathBuf>,
) -> eyre::Result<Config> {
    let config = match config_string {
        Some(config_string) => Config::parse(config_string)?,
        None => {
            let config_file = match config_file {
                Some(path) => path,
                None => default_config_path()?,
            };
            Config::parse_file(&config_file)?
        }
    };
    Ok(config)
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    setup_logger()?;

    let cli::Cli {
        config_file,
        config_string,
        subcommand,
    } = cli::Cli::parse();
    let secrets = secrets::Secrets;
    match subcommand {
        cli::Cmd::Run(run_args) => {
            let config = load_config(config_string.as_deref(), config_file)?;
            commands::run(&config, &secrets, run_args)
        }
        cli::Cmd::Config => {
            let config = load_config(config_string.as_deref(), config_file)?;
            commands::config(&config)
        }
        cli::Cmd::Version => commands::version(),
    }
}
