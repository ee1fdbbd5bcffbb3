//! Tick timing and profiling instrumentation.
//!
//! ## Features
//!
//! - **Tick timing**: rolling window of tick durations with slow-tick warnings
//! - **Phase statistics**: per-phase averages and p95 (hands, sockets, pointers, buttons)
//! - **Scoped timers**: RAII timing for code blocks
//! - **Conditional compilation**: `profile_scope!` is free unless the
//!   `profiling` feature is enabled
//!
//! ```ignore
//! fn advance_snaps(&mut self) {
//!     profile_scope!("sockets::snap");
//!     // ...
//! }
//! ```

use crate::constants::TARGET_TICK_MS;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::{debug, warn};

/// Number of ticks kept for rolling averages
const SAMPLE_COUNT: usize = 90;

/// Number of samples kept per phase
const STATS_SAMPLE_COUNT: usize = 100;

// ============================================================================
// Profiling Macros (zero-cost when disabled)
// ============================================================================

/// Time the rest of the enclosing scope. Compiles to nothing without the
/// `profiling` feature.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

// ============================================================================
// Operation Statistics
// ============================================================================

/// Rolling statistics for one named operation.
#[derive(Debug, Clone)]
pub struct OperationStats {
    samples: VecDeque<f64>,
    count: u64,
    min_ms: f64,
    max_ms: f64,
    sum_ms: f64,
}

impl Default for OperationStats {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(STATS_SAMPLE_COUNT),
            count: 0,
            min_ms: f64::MAX,
            max_ms: 0.0,
            sum_ms: 0.0,
        }
    }
}

impl OperationStats {
    pub fn record(&mut self, ms: f64) {
        if self.samples.len() >= STATS_SAMPLE_COUNT {
            if let Some(old) = self.samples.pop_front() {
                self.sum_ms -= old;
            }
        }
        self.samples.push_back(ms);
        self.sum_ms += ms;
        self.count += 1;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);
    }

    /// Average over the retained samples.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum_ms / self.samples.len() as f64
        }
    }

    pub fn p95(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() as f64) * 0.95).floor() as usize;
        sorted.get(idx.min(sorted.len() - 1)).copied().unwrap_or(0.0)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn max(&self) -> f64 {
        self.max_ms
    }
}

// ============================================================================
// Tick Monitor
// ============================================================================

/// Wall-clock timing of [`InteractionWorld::tick`](crate::world::InteractionWorld::tick).
pub struct TickMonitor {
    tick_times: VecDeque<f64>,
    tick_start: Option<Instant>,
    slow_tick_ms: f64,
    slow_tick_count: u64,
    total_ticks: u64,
    phase_stats: HashMap<&'static str, OperationStats>,
}

impl Default for TickMonitor {
    fn default() -> Self {
        Self::new(TARGET_TICK_MS * 2.0)
    }
}

impl TickMonitor {
    pub fn new(slow_tick_ms: f64) -> Self {
        Self {
            tick_times: VecDeque::with_capacity(SAMPLE_COUNT),
            tick_start: None,
            slow_tick_ms,
            slow_tick_count: 0,
            total_ticks: 0,
            phase_stats: HashMap::new(),
        }
    }

    pub fn begin_tick(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// Close the current tick. Returns its duration in milliseconds.
    pub fn end_tick(&mut self) -> Option<f64> {
        let start = self.tick_start.take()?;
        let ms = start.elapsed().as_secs_f64() * 1000.0;

        if self.tick_times.len() >= SAMPLE_COUNT {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(ms);
        self.total_ticks += 1;

        if ms > self.slow_tick_ms {
            self.slow_tick_count += 1;
            warn!(
                tick_time_ms = format!("{:.2}", ms),
                budget_ms = format!("{:.2}", self.slow_tick_ms),
                "Slow tick detected"
            );
        }

        Some(ms)
    }

    /// Time one phase of the tick.
    pub fn time_phase<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let (result, elapsed_ms) = measure(f);
        self.record_phase(name, elapsed_ms);
        result
    }

    pub fn record_phase(&mut self, name: &'static str, elapsed_ms: f64) {
        self.phase_stats.entry(name).or_default().record(elapsed_ms);
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn average_tick_time(&self) -> f64 {
        if self.tick_times.is_empty() {
            return 0.0;
        }
        self.tick_times.iter().sum::<f64>() / self.tick_times.len() as f64
    }

    pub fn max_tick_time(&self) -> f64 {
        self.tick_times.iter().copied().fold(0.0, f64::max)
    }

    pub fn slow_tick_percentage(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        (self.slow_tick_count as f64 / self.total_ticks as f64) * 100.0
    }

    pub fn phase_stats(&self, name: &str) -> Option<&OperationStats> {
        self.phase_stats.get(name)
    }

    /// Log a summary of recent ticks and the slowest phases.
    pub fn log_summary(&self) {
        debug!(
            ticks = self.total_ticks,
            avg_tick_ms = format!("{:.3}", self.average_tick_time()),
            max_tick_ms = format!("{:.3}", self.max_tick_time()),
            slow_percentage = format!("{:.1}%", self.slow_tick_percentage()),
            "Tick timing"
        );

        let mut phases: Vec<_> = self.phase_stats.iter().collect();
        phases.sort_by(|a, b| b.1.average().total_cmp(&a.1.average()));
        for (name, stats) in phases {
            debug!(
                "  {}: avg={:.3}ms, p95={:.3}ms, max={:.3}ms, count={}",
                name,
                stats.average(),
                stats.p95(),
                stats.max(),
                stats.count()
            );
        }
    }

    pub fn reset(&mut self) {
        self.tick_times.clear();
        self.tick_start = None;
        self.slow_tick_count = 0;
        self.total_ticks = 0;
        self.phase_stats.clear();
    }
}

// ============================================================================
// Scoped Timer
// ============================================================================

/// Logs its own lifetime on drop when it exceeds a threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Low threshold (0.5ms) for `profile_scope!`.
    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, 0.5)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms > self.threshold_ms {
            warn!(
                operation = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow operation"
            );
        }
    }
}

/// Run a closure and return its result with the elapsed milliseconds.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (result, elapsed_ms)
}
