use std::time::Duration;

/// Arms a feature only after its condition has held continuously for a minimum duration.
///
/// Any sample where the condition does not hold disarms the debouncer and restarts the window.
/// No credit is carried across interruptions, so a condition that flickers never arms.
#[derive(Debug, Default, Clone)]
pub struct ActivationDebouncer {
    condition_since: Option<Duration>,
    armed: bool,
}

impl ActivationDebouncer {
    /// Feed the condition as sampled at `now` and get the armed state.
    pub fn update(&mut self, condition_holds: bool, now: Duration, debounce: Duration) -> bool {
        if !condition_holds {
            self.reset();
            return false;
        }
        let Some(since) = self.condition_since else {
            self.condition_since = Some(now);
            return self.armed;
        };
        self.armed = now.saturating_sub(since) >= debounce;
        self.armed
    }

    pub fn reset(&mut self) {
        self.condition_since = None;
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// When the current uninterrupted run of the condition started.
    pub fn condition_since(&self) -> Option<Duration> {
        self.condition_since
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn not_armed_inside_window() {
        let mut debouncer = ActivationDebouncer::default();
        for t in (0..500).step_by(50) {
            assert!(!debouncer.update(true, ms(t), DEBOUNCE), "armed at {t}ms");
        }
        assert!(!debouncer.update(true, ms(499), DEBOUNCE));
        assert!(debouncer.update(true, ms(501), DEBOUNCE));
        assert!(debouncer.is_armed());
    }

    #[test]
    fn arms_exactly_at_debounce_duration() {
        let mut debouncer = ActivationDebouncer::default();
        debouncer.update(true, ms(1000), DEBOUNCE);
        assert!(debouncer.update(true, ms(1500), DEBOUNCE));
    }

    #[test]
    fn single_false_sample_restarts_window() {
        let mut debouncer = ActivationDebouncer::default();
        debouncer.update(true, ms(0), DEBOUNCE);
        assert!(debouncer.update(true, ms(600), DEBOUNCE));

        assert!(!debouncer.update(false, ms(650), DEBOUNCE));
        assert_eq!(debouncer.condition_since(), None);
        assert!(!debouncer.is_armed());

        assert!(!debouncer.update(true, ms(700), DEBOUNCE));
        assert!(!debouncer.update(true, ms(1100), DEBOUNCE));
        assert!(debouncer.update(true, ms(1200), DEBOUNCE));
    }

    #[test]
    fn zero_debounce_arms_on_second_sample() {
        let mut debouncer = ActivationDebouncer::default();
        assert!(!debouncer.update(true, ms(10), Duration::ZERO));
        assert!(debouncer.update(true, ms(10), Duration::ZERO));
    }
}
