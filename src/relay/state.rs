//! Shared relay state
//!
//! The topology, the policy store and the config are each behind their own
//! read/write lock: rebuilds and updates take the write side, evaluations
//! only ever read.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::RelayConfig;
use crate::policy::ApplicationPolicyStore;
use crate::screen::DisplayTopology;

/// Handles to the state shared between the router and its owners
#[derive(Debug, Clone, Default)]
pub struct RelayState {
    topology: Arc<RwLock<DisplayTopology>>,
    policies: Arc<RwLock<ApplicationPolicyStore>>,
    config: Arc<RwLock<RelayConfig>>,
}

impl RelayState {
    pub fn new(topology: DisplayTopology, policies: ApplicationPolicyStore, config: RelayConfig) -> Self {
        Self {
            topology: Arc::new(RwLock::new(topology)),
            policies: Arc::new(RwLock::new(policies)),
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn topology(&self) -> RwLockReadGuard<'_, DisplayTopology> {
        read(&self.topology)
    }

    pub fn topology_mut(&self) -> RwLockWriteGuard<'_, DisplayTopology> {
        write(&self.topology)
    }

    pub fn policies(&self) -> RwLockReadGuard<'_, ApplicationPolicyStore> {
        read(&self.policies)
    }

    pub fn policies_mut(&self) -> RwLockWriteGuard<'_, ApplicationPolicyStore> {
        write(&self.policies)
    }

    pub fn config(&self) -> RwLockReadGuard<'_, RelayConfig> {
        read(&self.config)
    }

    pub fn config_mut(&self) -> RwLockWriteGuard<'_, RelayConfig> {
        write(&self.config)
    }

    pub fn is_enabled(&self) -> bool {
        self.config().globally_enabled
    }

    /// Flip the master switch; returns the previous value
    pub fn set_enabled(&self, enabled: bool) -> bool {
        std::mem::replace(&mut self.config_mut().globally_enabled, enabled)
    }
}

// Poisoned locks are recovered rather than propagated.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_visible_to_clones() {
        let state = RelayState::default();
        let reader = state.clone();

        assert!(reader.is_enabled());
        assert!(state.set_enabled(false));
        assert!(!reader.is_enabled());
    }
}
