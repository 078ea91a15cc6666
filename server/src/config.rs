//! Server configuration, sourced from the environment with sane defaults.

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `LASER_SERVER_ADDR`, falling back to the default bind address.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("LASER_SERVER_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        Self { bind_addr }
    }
}
