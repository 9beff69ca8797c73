//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use faultline_config::{Config, ErrorsConfig, HealthConfig, ServerConfig, TelemetryConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                errors: ErrorsConfig::default(),
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Read the request id from a different header
    pub fn with_request_id_header(mut self, header: &str) -> Self {
        self.config.errors.request_id_header = header.to_owned();
        self
    }

    /// Generate a request id when the client sends none
    pub fn generating_request_ids(mut self) -> Self {
        self.config.errors.generate_request_id = true;
        self
    }

    /// Move the health endpoint
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
