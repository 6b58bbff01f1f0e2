use std::{ops::ControlFlow, time::Instant};

use indicatif::ProgressBar;
use tracing::debug;

use crate::{
    SAMPLE_INTERVAL,
    models::{MeasurementState, TransferProgress},
    utils::{format_duration, percent_complete},
};

/// Source of the current time for sampling.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Turns irregular progress ticks into one-second throughput samples.
///
/// A sample is closed on the first tick at least one second after the
/// previous one; its delta updates the peak, and the lowest rate when the
/// delta is non-zero.
pub struct ProgressSampler<C: Clock = SystemClock> {
    clock: C,
    state: MeasurementState,
    last_sample_time: Instant,
    last_sample_bytes: u64,
    progress_bar: Option<ProgressBar>,
}

impl<C: Clock> ProgressSampler<C> {
    /// Starts a measurement, recording the start time.
    pub fn start(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            state: MeasurementState {
                start_time: Some(now),
                ..Default::default()
            },
            last_sample_time: now,
            last_sample_bytes: 0,
            progress_bar: None,
        }
    }

    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    pub fn state(&self) -> &MeasurementState {
        &self.state
    }

    /// Progress hook handed to the transport.
    pub fn on_progress(&mut self, tick: TransferProgress) -> ControlFlow<()> {
        if self.state.total_bytes.is_none() && tick.download_total > 0 {
            self.state.total_bytes = Some(tick.download_total);
        }

        let now = self.clock.now();
        if now.saturating_duration_since(self.last_sample_time) >= SAMPLE_INTERVAL {
            self.close_sample(now, tick.downloaded);
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_message(self.status_line(now, tick));
        }

        ControlFlow::Continue(())
    }

    fn close_sample(&mut self, now: Instant, downloaded: u64) {
        let delta = downloaded.saturating_sub(self.last_sample_bytes);
        if delta != 0 {
            if self.state.most_bytes_per_sec.is_none_or(|most| delta > most) {
                self.state.most_bytes_per_sec = Some(delta);
            }
            if self.state.least_bytes_per_sec.is_none_or(|least| delta < least) {
                self.state.least_bytes_per_sec = Some(delta);
            }
        }
        debug!(
            "sample closed: {} bytes (peak {:?}, lowest {:?})",
            delta, self.state.most_bytes_per_sec, self.state.least_bytes_per_sec
        );

        self.last_sample_time = now;
        self.last_sample_bytes = downloaded;
    }

    /// Seconds left at the average rate since start, once a full second
    /// has passed. `None` while nothing has arrived or the total is unknown.
    pub fn eta_secs(&self, now: Instant, tick: TransferProgress) -> Option<u64> {
        let start = self.state.start_time?;
        let elapsed = now.saturating_duration_since(start).as_secs();
        if elapsed == 0 || tick.download_total <= tick.downloaded {
            return None;
        }
        let rate = tick.downloaded / elapsed;
        if rate == 0 {
            return None;
        }
        Some((tick.download_total - tick.downloaded) / rate)
    }

    fn status_line(&self, now: Instant, tick: TransferProgress) -> String {
        let percent = percent_complete(tick.downloaded, tick.download_total);
        let mut line = format!("Calculating... ({:.0}%)", percent);
        let eta = self
            .eta_secs(now, tick)
            .map(|secs| format_duration(secs as i64))
            .filter(|text| !text.is_empty());
        if let Some(eta) = eta {
            line.push_str("  ETA ");
            line.push_str(&eta);
        }
        line
    }

    /// Ends the measurement, recording the end time and clearing the live
    /// progress line.
    pub fn finish(mut self) -> MeasurementState {
        self.state.end_time = Some(self.clock.now());
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
        self.state
    }
}
