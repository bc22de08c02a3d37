//! Registry tuning

use kestrel_backend::SurfaceRetryPolicy;
use kestrel_navigation::DEFAULT_HISTORY_CAPACITY;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TabsConfig {
    /// How long a navigation may stay loading before it is forced idle
    pub load_timeout: Duration,
    /// Deadline for any single backend command
    pub backend_timeout: Duration,
    pub retry: SurfaceRetryPolicy,
    pub history_capacity: usize,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            backend_timeout: Duration::from_secs(10),
            retry: SurfaceRetryPolicy::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
