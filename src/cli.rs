use std::path::PathBuf;

/// A configuration-driven backup tool for RouterOS devices.
#[derive(clap::Parser)]
pub struct Cli {
    /// Sets a custom configuration file path
    #[arg(short, long, env = "ROSBAK_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Sets the configuration from a string
    #[arg(long, env = "ROSBAK_CONFIG")]
    pub config_string: Option<String>,

    #[command(subcommand)]
    pub subcommand: Cmd,
}

#[derive(clap::Subcommand)]
pub enum Cmd {
    /// Runs a backup cycle over the configured devices
    Run(run::Cli),

    /// Prints the active configuration
    Config,

    /// Prints version information
    Version,
}

pub mod run {
    #[derive(clap::Args)]
    pub struct Cli {
        /// Backs up only this device instead of the whole list
        #[arg(value_name = "DEVICE")]
        pub device: Option<String>,
    }
}
