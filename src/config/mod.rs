use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod device;
pub mod telegram;

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(alias = "backup_root")]
    pub backup_root: PathBuf,
    #[serde(default)]
    pub devices: Vec<device::Definition>,
    pub telegram: telegram::Definition,

    /// path of the configuration file, if the configuration was loaded from a file
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("invalid configuration string")]
    InvalidConfigString(String, #[source] eyre::Report),
    #[error("invalid configuration file {}", .0.display())]
    InvalidConfigFile(PathBuf, #[source] eyre::Report),
    #[error("i/o error reading configuration file {}", .0.display())]
    IoError(PathBuf, std::io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("unknown device '{}'", (self.0).0)]
pub struct UnknownDevice(pub device::Name);

impl Config {
    pub fn parse(s: &str) -> Result<Config, ConfigLoadError> {
        toml::from_str(s).map_err(|e| ConfigLoadError::InvalidConfigString(s.to_owned(), e.into()))
    }

    pub fn parse_file(p: &Path) -> Result<Config, ConfigLoadError> {
        let config_string = std::fs::read_to_string(p)
            .map_err(|e| ConfigLoadError::IoError(p.to_owned(), e))?;
        let mut config: Config = toml::from_str(&config_string)
            .map_err(|e| ConfigLoadError::InvalidConfigFile(p.to_owned(), e.into()))?;
        config.source = Some(p.to_owned());
        Ok(config)
    }

    pub fn device(&self, name: &device::Name) -> Result<&device::Definition, UnknownDevice> {
        self.devices
            .iter()
            .find(|device| &device.name == name)
            .ok_or_else(|| UnknownDevice(name.clone()))
    }
}
