//! Environment-based server configuration.

use std::net::SocketAddr;

/// Server configuration, read from the environment.
///
/// | Variable                 | Default          |
/// |--------------------------|------------------|
/// | `JANSEVA_BIND_ADDR`      | `127.0.0.1:3000` |
/// | `JANSEVA_FEED_CAPACITY`  | `256`            |
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Buffered event capacity of the change feed.
    pub feed_capacity: usize,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// `anyhow::Error` when a variable is set but unparseable; unset
    /// variables fall back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bind_addr: env_or("JANSEVA_BIND_ADDR", "127.0.0.1:3000")?,
            feed_capacity: env_or("JANSEVA_FEED_CAPACITY", "256")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            feed_capacity: 256,
        }
    }
}

fn env_or<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {name}: {e}")),
        Err(_) => default.parse().map_err(|e| {
            anyhow::anyhow!("invalid default for {name}: {e}")
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.feed_capacity, 256);
    }
}
