use crate::HelperError;

use super::target::HelperOrigin;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct LocalServerConfig {
    pub host: String,
    pub port: u16,
    /// Reject callbacks whose `state` differs from the one generated when
    /// authorization started. Off unless asked for.
    pub verify_state: bool,
}

impl Default for LocalServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl LocalServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            verify_state: false,
        }
    }

    pub fn from_origin(origin: &str) -> Result<Self, HelperError> {
        let origin = HelperOrigin::parse(origin)?;
        Ok(Self::new(origin.host, origin.port))
    }

    /// The page origin, which is also the registered redirect URI.
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn with_verify_state(mut self, verify_state: bool) -> Self {
        self.verify_state = verify_state;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::LocalServerConfig;

    #[test]
    fn origin_has_no_trailing_slash() {
        let config = LocalServerConfig::new("localhost", 3000);
        assert_eq!(config.origin(), "http://localhost:3000");
        assert!(!config.verify_state);
    }

    #[test]
    fn from_origin_reads_host_and_port() {
        let config = LocalServerConfig::from_origin("http://127.0.0.1:8765").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8765);
    }
}
