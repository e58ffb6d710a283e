use crate::secrets::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Definition {
    pub token: Secret,
    #[serde(alias = "chat_id")]
    pub chat_id: String,
    #[serde(
        default = "default_request_timeout",
        with = "humantime_serde",
        alias = "request_timeout"
    )]
    pub request_timeout: Duration,
}
