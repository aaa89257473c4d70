//! Listener configuration.

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::{Result, ServerError};

/// Default notification listener port.
pub const DEFAULT_PORT: u16 = 3333;

/// Default bound on payloads processed concurrently.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Configuration for the notification listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind the listener to.
    pub bind_address: SocketAddr,

    /// Maximum number of payloads processed at once. Further payloads are
    /// still acknowledged and wait for a free slot.
    pub max_in_flight: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl ServerConfig {
    /// Create a new config with the given bind address.
    #[must_use]
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Create a config listening on all interfaces at `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Set the concurrent payload bound.
    #[must_use]
    pub const fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_in_flight` is zero or does not fit in a `u32`.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(ServerError::InvalidConfig {
                reason: "max_in_flight must be at least 1".to_string(),
            });
        }
        if u32::try_from(self.max_in_flight).is_err() {
            return Err(ServerError::InvalidConfig {
                reason: format!("max_in_flight {} is too large", self.max_in_flight),
            });
        }
        Ok(())
    }
}
