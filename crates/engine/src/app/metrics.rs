use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    pub clamped_frames: u32,
}

/// Collects per-frame timings and emits one snapshot per interval.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    clamped_frames: u32,
    frame_time_sum: Duration,
    frame_time_max: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            clamped_frames: 0,
            frame_time_sum: Duration::ZERO,
            frame_time_max: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, raw_frame_dt: Duration, was_clamped: bool) {
        self.frames = self.frames.saturating_add(1);
        if was_clamped {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
        self.frame_time_sum = self.frame_time_sum.saturating_add(raw_frame_dt);
        self.frame_time_max = self.frame_time_max.max(raw_frame_dt);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            max_frame_time_ms: self.frame_time_max.as_secs_f32() * 1000.0,
            clamped_frames: self.clamped_frames,
        };

        *self = Self::starting_at(now, self.interval);
        Some(snapshot)
    }
}
