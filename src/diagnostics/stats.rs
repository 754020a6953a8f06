use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects conversion statistics for a preview session.
pub struct ConvertStats {
    frame_count: u64,
    drop_count: u64,
    total_bytes: u64,
    start_time: Instant,
    last_convert: Duration,
}

/// Snapshot of conversion stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSnapshot {
    pub fps: f64,
    pub frame_count: u64,
    pub drop_count: u64,
    pub drop_rate: f64,
    pub convert_ms: f64,
    pub bandwidth_bps: u64,
}

impl ConvertStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            drop_count: 0,
            total_bytes: 0,
            start_time: Instant::now(),
            last_convert: Duration::ZERO,
        }
    }

    /// Record a successfully converted and published frame.
    pub fn record_frame(&mut self, bytes: usize, convert_time: Duration) {
        self.frame_count += 1;
        self.total_bytes += bytes as u64;
        self.last_convert = convert_time;
    }

    /// Record a dropped frame.
    pub fn record_drop(&mut self) {
        self.drop_count += 1;
    }

    /// Calculate current FPS based on elapsed time.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.frame_count as f64 / elapsed
    }

    /// Drop rate as a percentage (0.0 - 100.0).
    pub fn drop_rate(&self) -> f64 {
        let total = self.frame_count + self.drop_count;
        if total == 0 {
            return 0.0;
        }
        (self.drop_count as f64 / total as f64) * 100.0
    }

    /// Time the most recent frame spent in the converter, in milliseconds.
    pub fn convert_ms(&self) -> f64 {
        self.last_convert.as_secs_f64() * 1000.0
    }

    /// Published bandwidth in bytes per second.
    pub fn bandwidth_bps(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.total_bytes as f64 / elapsed) as u64
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.drop_count = 0;
        self.total_bytes = 0;
        self.start_time = Instant::now();
        self.last_convert = Duration::ZERO;
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> ConvertSnapshot {
        ConvertSnapshot {
            fps: self.fps(),
            frame_count: self.frame_count,
            drop_count: self.drop_count,
            drop_rate: self.drop_rate(),
            convert_ms: self.convert_ms(),
            bandwidth_bps: self.bandwidth_bps(),
        }
    }
}

impl Default for ConvertStats {
    fn default() -> Self {
        Self::new()
    }
}
