//! Runtime configuration for the resolver and HTTP service.

use std::net::SocketAddr;
use std::time::Duration;

/// Default `User-Agent` for host-meta fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("xmpp-alt-connections/", env!("CARGO_PKG_VERSION"));

/// Configuration for DNS lookups, host-meta fetches and the listener.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP service binds to.
    pub listen_addr: SocketAddr,
    /// Timeout for each DNS query and each host-meta fetch.
    pub timeout: Duration,
    /// DNS attempts per query before giving up.
    pub dns_attempts: usize,
    /// Use `/etc/resolv.conf` (or the platform equivalent) instead of the
    /// built-in upstream resolvers.
    pub system_dns: bool,
    /// Largest host-meta body accepted, in bytes.
    pub max_document_bytes: usize,
    /// `User-Agent` header sent with host-meta fetches.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            timeout: Duration::from_secs(5),
            dns_attempts: 2,
            system_dns: true,
            max_document_bytes: 64 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the per-call network timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of DNS attempts.
    pub fn dns_attempts(mut self, attempts: usize) -> Self {
        self.dns_attempts = attempts.max(1);
        self
    }

    /// Choose between system and built-in DNS configuration.
    pub fn system_dns(mut self, enabled: bool) -> Self {
        self.system_dns = enabled;
        self
    }

    /// Set the host-meta size limit.
    pub fn max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = limit;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.dns_attempts, 2);
        assert!(config.user_agent.starts_with("xmpp-alt-connections/"));
    }

    #[test]
    fn builder_setters() {
        let config = Config::default()
            .listen_addr("0.0.0.0:9000".parse().unwrap())
            .timeout(Duration::from_secs(2))
            .dns_attempts(0)
            .system_dns(false)
            .max_document_bytes(1024)
            .user_agent("altconn-test/1.0");

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.dns_attempts, 1);
        assert!(!config.system_dns);
        assert_eq!(config.max_document_bytes, 1024);
        assert_eq!(config.user_agent, "altconn-test/1.0");
    }
}
