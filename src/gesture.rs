use std::time::Duration;

/// Detects two gesture pulses in quick succession.
///
/// The first pulse opens a window; a second pulse strictly inside that window triggers and
/// consumes the pair. A pulse that arrives after the window closed becomes the first half of a new
/// pair.
///
/// The debouncer does not know about preconditions. Callers feed it only the pulses that happen
/// while the precondition holds, and [`clear`](Self::clear) it when the precondition breaks so that
/// a stale first pulse cannot pair up with a later one.
#[derive(Debug, Default, Clone)]
pub struct GestureDebouncer {
    last_pulse: Option<Duration>,
}

impl GestureDebouncer {
    /// Register a pulse at `now` and report whether it completes a double tap.
    pub fn observe_pulse(&mut self, now: Duration, tap_window: Duration) -> bool {
        match self.last_pulse {
            Some(last_pulse) if last_pulse <= now && now - last_pulse < tap_window => {
                self.last_pulse = None;
                true
            }
            _ => {
                self.last_pulse = Some(now);
                false
            }
        }
    }

    /// Forget the pending first pulse, if any.
    pub fn clear(&mut self) {
        self.last_pulse = None;
    }

    pub fn last_pulse(&self) -> Option<Duration> {
        self.last_pulse
    }
}
