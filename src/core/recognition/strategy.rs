//! Ordered detection strategies.
//!
//! A strategy looks at one image and either returns a payload or gives up.
//! The cascade tries them in priority order and stops at the first hit.

use super::types::Detection;
use std::path::Path;

/// One way of reading a QR payload from an image
pub trait DetectionStrategy: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Try to read a payload; `None` lets the next strategy have a go
    fn detect(&self, path: &Path) -> Option<Detection>;
}

/// Strategies tried in a fixed order
#[derive(Default)]
pub struct StrategyCascade {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl StrategyCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy with lower priority than those already added
    pub fn with_strategy(mut self, strategy: Box<dyn DetectionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies until one succeeds
    pub fn detect(&self, path: &Path) -> Option<Detection> {
        self.strategies.iter().find_map(|strategy| {
            let detection = strategy.detect(path);
            if let Some(ref d) = detection {
                tracing::debug!(strategy = strategy.name(), code = %d.code, "QR detected");
            }
            detection
        })
    }
}
