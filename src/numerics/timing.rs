#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

use log::info;

/// Per-sweep wall-clock timings of one solve, collected with the `timing`
/// feature. Without the feature every function here is a no-op.
#[derive(Default, Clone)]
pub struct TimingStats {
    pub sweep_times: Vec<Duration>,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "timing")]
    pub fn print_summary(&self) {
        if self.sweep_times.is_empty() {
            return;
        }

        let total_sweeps: Duration = self.sweep_times.iter().sum();
        let overhead = self.total_time.saturating_sub(total_sweeps);
        let slowest = self.sweep_times.iter().max().copied().unwrap_or_default();

        info!("{}", "=".repeat(60));
        info!("{:^60}", "SOLVER TIMING SUMMARY");
        info!("{}", "=".repeat(60));
        info!(
            "Total solver time:             {:.3}s",
            self.total_time.as_secs_f64()
        );
        info!(
            "  Sweeps:                    {:>9.3}ms  (avg: {:>9.3}ms, max: {:>9.3}ms)",
            total_sweeps.as_secs_f64() * 1000.0,
            total_sweeps.as_secs_f64() * 1000.0 / self.sweep_times.len() as f64,
            slowest.as_secs_f64() * 1000.0
        );
        info!(
            "  Overhead/Other:            {:>9.3}ms",
            overhead.as_secs_f64() * 1000.0
        );
        info!("Iterations:                    {}", self.sweep_times.len());
    }

    #[cfg(not(feature = "timing"))]
    pub fn print_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
pub fn record_sweep<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        stats.borrow_mut().sweep_times.push(elapsed);
    });
    result
}

#[cfg(not(feature = "timing"))]
pub fn record_sweep<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing(total_time: Duration) -> TimingStats {
    TIMING_STATS.with(|stats| {
        let mut s = stats.borrow_mut();
        s.total_time = total_time;
        s.clone()
    })
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing(_total_time: Duration) -> TimingStats {
    TimingStats::new()
}

#[cfg(feature = "timing")]
pub fn finalize_and_print(total_time: Duration) {
    finalize_timing(total_time).print_summary();
}

#[cfg(not(feature = "timing"))]
pub fn finalize_and_print(_total_time: Duration) {}

#[cfg(all(test, feature = "timing"))]
mod tests {
    use super::*;

    #[test]
    fn sweeps_are_recorded() {
        reset_timing();
        let out = record_sweep(|| 3);
        record_sweep(|| ());
        let stats = finalize_timing(Duration::from_millis(1));
        assert_eq!(out, 3);
        assert_eq!(stats.sweep_times.len(), 2);
    }
}
