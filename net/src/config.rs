//! Configuration for peer selection.

use std::time::Duration;

/// Tuning knobs for the bandwidth-weighted peer tracker.
///
/// Controls how eagerly the tracker explores new peers versus exploiting
/// peers with known good response bandwidth.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Below this many responsive peers, every selection explores an
    /// untracked peer. Default: 20.
    pub desired_min_responsive_peers: usize,

    /// Exponent factor for the new-peer admission probability
    /// `exp(-responsive * factor)`. Default: 0.1.
    pub new_peer_connect_factor: f64,

    /// Probability of picking an arbitrary responsive peer instead of the
    /// bandwidth-heap top. Default: 0.2.
    pub random_peer_probability: f64,

    /// Half-life of the per-peer and global bandwidth averages.
    /// Default: 5 minutes.
    pub bandwidth_halflife: Duration,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            desired_min_responsive_peers: 20,
            new_peer_connect_factor: 0.1,
            random_peer_probability: 0.2,
            bandwidth_halflife: Duration::from_secs(5 * 60),
        }
    }
}

impl NetConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.random_peer_probability) {
            return Err(ConfigError::InvalidProbability(
                self.random_peer_probability,
            ));
        }
        if self.new_peer_connect_factor <= 0.0 {
            return Err(ConfigError::InvalidConnectFactor(
                self.new_peer_connect_factor,
            ));
        }
        if self.bandwidth_halflife.is_zero() {
            return Err(ConfigError::InvalidHalflife);
        }
        Ok(())
    }

    /// Config for tests: a tiny exploration quota so selection behavior is
    /// reachable with a handful of peers.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn dev_default() -> Self {
        Self {
            desired_min_responsive_peers: 2,
            ..Self::default()
        }
    }
}

/// Errors in peer-tracker configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("random_peer_probability must be in [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("new_peer_connect_factor must be > 0, got {0}")]
    InvalidConnectFactor(f64),
    #[error("bandwidth_halflife must be > 0")]
    InvalidHalflife,
}
