//! Retry policy for in-place surface navigation
//!
//! Navigating an existing surface may fail (the native view died, the engine
//! rejected the URL). The fallback is to tear the surface down and create a
//! fresh one. The policy bounds how many such fallbacks a single navigation
//! may take; there is no backoff between attempts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceRetryPolicy {
    /// Recreate attempts allowed after the in-place navigation fails
    pub max_retries: u32,
}

impl SurfaceRetryPolicy {
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// A policy that never falls back to recreating the surface
    pub const fn never() -> Self {
        Self { max_retries: 0 }
    }

    /// Whether another attempt is allowed after `failures` failed attempts
    pub fn allows_retry(&self, failures: u32) -> bool {
        failures > 0 && failures <= self.max_retries
    }
}

impl Default for SurfaceRetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}
