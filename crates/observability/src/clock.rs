//! Throughput accounting for dispatched blocks

use std::fmt;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};

/// Accumulated throughput state
#[derive(Debug, Clone, Copy)]
pub struct RateState {
    /// Blocks observed so far
    pub count: u64,
    /// Total payload bytes observed
    pub bytes: u64,
    /// Accumulated time between consecutive ticks
    pub wait: Duration,
    /// When the clock started
    pub started: Instant,
}

impl RateState {
    /// Mean blocks per second since the clock started
    pub fn block_rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Mean throughput in MiB/s since the clock started
    pub fn throughput_mib(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.bytes as f64 / (1024.0 * 1024.0) / elapsed
        } else {
            0.0
        }
    }
}

impl fmt::Display for RateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocks, {} bytes, {:.2} blocks/s, {:.3} MiB/s",
            self.count,
            self.bytes,
            self.block_rate(),
            self.throughput_mib()
        )
    }
}

/// Folds dispatched block sizes into running throughput figures
///
/// One tick per dispatched block; the clock tracks the gap since the
/// previous tick so stalls in the pipeline show up as accumulated wait.
#[derive(Debug)]
pub struct RateClock {
    state: RateState,
    last_tick: Instant,
}

impl RateClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            state: RateState {
                count: 0,
                bytes: 0,
                wait: Duration::ZERO,
                started: now,
            },
            last_tick: now,
        }
    }

    /// Record one dispatched block of `bytes` payload bytes
    pub fn tick(&mut self, bytes: u64) -> RateState {
        let now = Instant::now();
        let gap = now.duration_since(self.last_tick);
        self.last_tick = now;

        self.state.count += 1;
        self.state.bytes += bytes;
        self.state.wait += gap;

        counter!("detstream_blocks_dispatched_total").increment(1);
        counter!("detstream_bytes_dispatched_total").increment(bytes);
        histogram!("detstream_block_bytes").record(bytes as f64);

        self.state
    }

    /// Current accumulated state
    pub fn state(&self) -> RateState {
        self.state
    }
}

impl Default for RateClock {
    fn default() -> Self {
        Self::new()
    }
}
