//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Key material for the session and flash cookies, at least 64 bytes.
    pub secret: String,
    pub assets_dir: String,
    /// Seconds a form may sit untouched before it is dropped.
    #[serde(default = "default_form_idle_secs")]
    pub form_idle_secs: u64,
}

fn default_form_idle_secs() -> u64 {
    crate::services::registry::DEFAULT_IDLE_TTL.as_secs()
}
