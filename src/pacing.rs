use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of the call that just finished, used to pick the cool-down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Success,
    Failure,
}

/// Waits between successive calls to a remote service
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, outcome: Pace);
}

/// Sleeps a fixed interval, longer after a failure
#[derive(Debug, Clone)]
pub struct FixedPacer {
    pub success: Duration,
    pub failure: Duration,
}

impl FixedPacer {
    pub fn new(success: Duration, failure: Duration) -> Self {
        Self { success, failure }
    }

    fn interval(&self, outcome: Pace) -> Duration {
        match outcome {
            Pace::Success => self.success,
            Pace::Failure => self.failure,
        }
    }
}

#[async_trait]
impl Pacer for FixedPacer {
    async fn pause(&self, outcome: Pace) {
        let delay = self.interval(outcome);
        if delay.is_zero() {
            return;
        }
        debug!("Cooling down for {:?}", delay);
        sleep(delay).await;
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _outcome: Pace) {}
}
