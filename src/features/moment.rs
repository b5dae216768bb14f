use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Wall clock that never goes backwards, so shouts saved in order are stamped in
/// order even if the system clock is adjusted.
#[derive(Debug, Clone, Default)]
pub struct MomentClock {
    last: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl MomentClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let now = match *last {
            Some(previous) => Utc::now().max(previous),
            None => Utc::now(),
        };
        *last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments_are_monotonic() {
        let clock = MomentClock::new();
        let stamps: Vec<_> = (0..100).map(|_| clock.now()).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
