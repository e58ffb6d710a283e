use crate::secrets::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display name of a device. It doubles as the backup folder name, so it has
/// to be unique across the device list and filesystem-safe.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(pub String);

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(10)
}

// exports are noticeably slower than binary backups on larger configs
fn default_export_timeout() -> Duration {
    Duration::from_secs(60)
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Definition {
    pub name: Name,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: Secret,
    #[serde(
        default = "default_connect_timeout",
        with = "humantime_serde",
        alias = "connect_timeout"
    )]
    pub connect_timeout: Duration,
    #[serde(
        default = "default_command_timeout",
        with = "humantime_serde",
        alias = "command_timeout"
    )]
    pub command_timeout: Duration,
    #[serde(
        default = "default_export_timeout",
        with = "humantime_serde",
        alias = "export_timeout"
    )]
    pub export_timeout: Duration,
}
