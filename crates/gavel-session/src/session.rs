//! Session configuration.

use std::time::Duration;

/// Configuration for session behavior.
///
/// Sensible defaults are provided; override the fields you care about:
///
/// ```rust
/// use std::time::Duration;
/// use gavel_session::SessionConfig;
///
/// let config = SessionConfig {
///     ttl: Duration::from_secs(15 * 60),
/// };
/// assert!(config.ttl < SessionConfig::default().ttl);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session stays valid after login.
    ///
    /// Default: 100 minutes. A zero TTL issues sessions that are already
    /// expired, which is only useful in tests.
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(100 * 60),
        }
    }
}
