use std::time::Instant;

use tracing::info;

/// Scope timer that reports wall-clock duration when dropped.
pub struct FnTimer {
    label: &'static str,
    start: Instant,
}

impl FnTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since construction.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for FnTimer {
    fn drop(&mut self) {
        info!(
            "function \"{}\" took {:.6} seconds to complete",
            self.label,
            self.elapsed()
        );
    }
}

/// Runs a closure under a timer and passes its result through unchanged.
pub fn time<T>(label: &'static str, f: impl FnOnce() -> T) -> T {
    let _timer = FnTimer::new(label);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_passes_the_result_through() {
        assert_eq!(time("addition", || 41 + 1), 42);
    }

    #[test]
    fn elapsed_reports_non_negative_seconds() {
        let timer = FnTimer::new("noop");
        assert!(timer.elapsed() >= 0.0);
    }

    #[test]
    fn timer_can_wrap_fallible_work() {
        let result: Result<usize, &str> = time("fallible", || Ok(3));
        assert_eq!(result, Ok(3));
    }
}
