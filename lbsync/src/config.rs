//! Reconciler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between two poll refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default time Create and Delete may wait for a terminal state.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Tunables shared by every lifecycle call of a reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Fixed interval between poll refreshes.
    #[serde(with = "secs")]
    pub poll_interval: Duration,
    /// Create timeout handed to new resources.
    #[serde(with = "secs")]
    pub create_timeout: Duration,
    /// Delete timeout handed to new resources.
    #[serde(with = "secs")]
    pub delete_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            create_timeout: DEFAULT_TIMEOUT,
            delete_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Serde adapter storing a [`Duration`] as whole seconds.
pub(crate) mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
