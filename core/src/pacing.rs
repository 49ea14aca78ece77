use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Spaces out sequential attempts so a server is not hammered.
/// The first `wait` returns immediately.
pub struct Pacer {
    ticker: Option<Interval>,
}

impl Pacer {
    pub fn new(gap: Duration) -> Self {
        if gap.is_zero() {
            return Pacer { ticker: None };
        }
        let mut t = interval(gap);
        t.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Pacer { ticker: Some(t) }
    }

    pub async fn wait(&mut self) {
        if let Some(t) = self.ticker.as_mut() {
            t.tick().await;
        }
    }
}
