use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use smartmon_types::{Result, SmartError};

use crate::SmartConfig;

/// Shared configuration handle with atomic snapshot/update semantics.
///
/// The scheduler loop snapshots this once per iteration; operator commands
/// replace the whole value. There is deliberately no partial mutation: a
/// writer builds the new `SmartConfig` and swaps it in, so readers never
/// observe a half-updated configuration.
#[derive(Debug)]
pub struct ConfigHandle {
    inner: ArcSwap<SmartConfig>,
}

impl ConfigHandle {
    /// Wrap an in-memory configuration.
    pub fn new(config: SmartConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    /// Load a TOML configuration file; the file may omit any field, in which
    /// case the documented default applies.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SmartError::ConfigInvalid(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: SmartConfig = toml::from_str(&content)
            .map_err(|e| SmartError::ConfigInvalid(format!("{}: {e}", path.display())))?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(Self::new(config))
    }

    /// Take a point-in-time snapshot of the configuration.
    pub fn snapshot(&self) -> SmartConfig {
        (**self.inner.load()).clone()
    }

    /// Replace the configuration after validating it.
    pub fn update(&self, new_config: SmartConfig) -> Result<()> {
        new_config.validate()?;
        self.inner.store(Arc::new(new_config));
        Ok(())
    }

    /// Set the `active` flag, leaving everything else untouched.
    ///
    /// Callers that toggle this must also raise the scheduler wake signal so
    /// the change takes effect before the current sleep runs out.
    pub fn set_active(&self, active: bool) {
        let mut cfg = self.snapshot();
        cfg.active = active;
        self.inner.store(Arc::new(cfg));
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(SmartConfig::default())
    }
}
