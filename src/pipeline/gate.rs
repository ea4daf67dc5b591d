use std::time::{Duration, Instant};

/// Enforces the minimum time between two reports in continuous mode.
#[derive(Debug, Clone)]
pub struct RenderGate {
    interval: Duration,
    last_render: Instant,
}

impl RenderGate {
    /// The clock starts at `now`, so the first report also waits a full interval.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_render: now,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_render) >= self.interval
    }

    /// A render goes ahead only when there is something to show and the
    /// interval has elapsed.
    pub fn should_render(&self, now: Instant, table_empty: bool) -> bool {
        !table_empty && self.is_due(now)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_render_within_interval_suppressed() {
        let start = Instant::now();
        let mut gate = RenderGate::new(Duration::from_secs(5), start);

        let first = start + Duration::from_secs(5);
        assert!(gate.should_render(first, false));
        gate.mark_rendered(first);

        let second = first + Duration::from_secs(3);
        assert!(!gate.should_render(second, false));

        let third = first + Duration::from_secs(5);
        assert!(gate.should_render(third, false));
    }

    #[test]
    fn test_first_render_waits_for_interval() {
        let start = Instant::now();
        let gate = RenderGate::new(Duration::from_secs(5), start);
        assert!(!gate.is_due(start + Duration::from_secs(4)));
        assert!(gate.is_due(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_empty_table_never_renders() {
        let start = Instant::now();
        let gate = RenderGate::new(Duration::ZERO, start);
        assert!(!gate.should_render(start + Duration::from_secs(60), true));
    }

    #[test]
    fn test_zero_interval_always_due() {
        let start = Instant::now();
        let mut gate = RenderGate::new(Duration::ZERO, start);
        assert!(gate.should_render(start, false));
        gate.mark_rendered(start);
        assert!(gate.should_render(start, false));
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let start = Instant::now() + Duration::from_secs(10);
        let gate = RenderGate::new(Duration::from_secs(1), start);
        assert!(!gate.is_due(start - Duration::from_secs(5)));
    }
}
