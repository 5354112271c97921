use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::error::AnalysisError;

use super::backend::{Detector, DetectorRole};

/// Thread-safe registry of detectors keyed by role.
///
/// Detectors are wrapped in `Mutex` because `Detector::detect` takes `&mut self`.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: HashMap<DetectorRole, Arc<Mutex<dyn Detector>>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detector for a role, replacing any previous one.
    pub fn register<D: Detector + 'static>(&mut self, role: DetectorRole, detector: D) {
        log::debug!("registering detector '{}' as {}", detector.name(), role);
        self.detectors.insert(role, Arc::new(Mutex::new(detector)));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<D: Detector + 'static>(mut self, role: DetectorRole, detector: D) -> Self {
        self.register(role, detector);
        self
    }

    pub fn get(&self, role: DetectorRole) -> Option<Arc<Mutex<dyn Detector>>> {
        self.detectors.get(&role).cloned()
    }

    pub fn contains(&self, role: DetectorRole) -> bool {
        self.detectors.contains_key(&role)
    }

    /// Registered roles, sorted by name.
    pub fn roles(&self) -> Vec<DetectorRole> {
        let mut roles: Vec<_> = self.detectors.keys().copied().collect();
        roles.sort_by_key(|role| role.to_string());
        roles
    }

    /// Fail unless every role in `roles` is registered.
    pub fn require(&self, roles: &[DetectorRole]) -> Result<()> {
        match roles.iter().find(|role| !self.contains(**role)) {
            Some(missing) => Err(AnalysisError::MissingDetector(*missing).into()),
            None => Ok(()),
        }
    }

    /// Run `f` with exclusive access to the detector registered for `role`.
    pub fn with_detector<T>(
        &self,
        role: DetectorRole,
        f: impl FnOnce(&mut dyn Detector) -> Result<T>,
    ) -> Result<T> {
        let detector = self
            .get(role)
            .ok_or(AnalysisError::MissingDetector(role))?;
        let mut guard = detector
            .lock()
            .map_err(|_| anyhow!("{} detector lock poisoned", role))?;
        f(&mut *guard)
    }
}
