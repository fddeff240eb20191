use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

use crate::config::PacingConfig;
use crate::metrics;

/// Delay inserted before each remote mutation.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps a whole number of seconds drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomPacer {
    min_secs: u64,
    max_secs: u64,
}

impl RandomPacer {
    /// Bounds are swapped if given out of order.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    pub fn next_delay(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

impl From<&PacingConfig> for RandomPacer {
    fn from(config: &PacingConfig) -> Self {
        Self::new(config.min_secs, config.max_secs)
    }
}

#[async_trait]
impl Pacer for RandomPacer {
    async fn pause(&self) {
        let delay = self.next_delay();
        debug!(delay_secs = delay.as_secs(), "Pacing before next action");
        metrics::PACING_DELAY
            .with_label_values(&[])
            .observe(delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// No delay at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self) {}
}
