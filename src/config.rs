//! # Registry configuration.
//!
//! Provides [`RegistryConfig`], the settings a [`JobRegistry`](crate::JobRegistry)
//! is built with via [`JobRegistry::with_config`](crate::JobRegistry::with_config).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus

/// Configuration for a job registry.
///
/// ## Field semantics
/// - `bus_capacity`: ring buffer size of the async event bus (min 1; clamped by Bus)
/// - `remove_succeeded`: whether the default finish handler drops succeeded jobs
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Capacity of the broadcast channel behind [`JobRegistry::watch`](crate::JobRegistry::watch).
    ///
    /// Async observers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Behaviour of the default finish handler.
    ///
    /// - `true`: a job that finishes with `Succeeded` is deregistered
    /// - `false`: finished jobs stay until removed explicitly
    ///
    /// Faulted jobs always stay, whatever this is set to.
    pub remove_succeeded: bool,
}

impl RegistryConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `remove_succeeded = true` (successful jobs self-clean)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            remove_succeeded: true,
        }
    }
}
