use crate::configuration::{Configuration, ConfigurationUpdate};
use log::info;
use std::sync::{Arc, PoisonError, RwLock};

/// The single, shared [`Configuration`] of a mock server.
///
/// `ConfigurationStore` is a cheap handle: clones point to the same configuration. Every read
/// returns a snapshot by value and every write is applied under one lock acquisition, so a
/// reader never observes half of an update.
///
/// Each [`MockServer`] owns its own store: there is no process-wide global.
///
/// [`MockServer`]: crate::MockServer
#[derive(Clone, Debug, Default)]
pub struct ConfigurationStore {
    configuration: Arc<RwLock<Configuration>>,
}

impl ConfigurationStore {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Arc::new(RwLock::new(configuration)),
        }
    }

    /// A snapshot of the current configuration.
    pub fn get(&self) -> Configuration {
        // A panic while holding the lock cannot leave an invalid `Configuration` behind:
        // every write is a single assignment of a complete value.
        *self
            .configuration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the fields present in `update` and return the resulting configuration.
    pub fn update(&self, update: ConfigurationUpdate) -> Configuration {
        let mut guard = self
            .configuration
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let old = *guard;
        let new = old.merge(&update);
        *guard = new;
        drop(guard);

        log_change(&old, &new);
        new
    }

    /// Overwrite the whole configuration, returning the previous one.
    pub fn replace(&self, configuration: Configuration) -> Configuration {
        let old = std::mem::replace(
            &mut *self
                .configuration
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            configuration,
        );

        log_change(&old, &configuration);
        old
    }
}

fn log_change(old: &Configuration, new: &Configuration) {
    info!("Configuration updated. Old: {}. New: {}.", old, new);
}
