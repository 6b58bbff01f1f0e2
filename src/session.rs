use indicatif::{ProgressBar, ProgressStyle};
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::{
    Error, PROGRAM_NAME, TransferError,
    downloader::{HttpTransport, Transport, TransferRequest},
    models::{
        DisplayMode, FormattedReport, MeasurementState, SessionConfig, TargetFlags,
        TargetSelection, TransferProgress,
    },
    sampler::{Clock, ProgressSampler, SystemClock},
    utils::{format_average_rate, format_duration, format_known_size, format_rate},
};

/// Runs one measured transfer and turns the measurement into a report.
pub struct Session<T: Transport = HttpTransport, C: Clock = SystemClock> {
    mode: DisplayMode,
    config: SessionConfig,
    transport: T,
    clock: C,
}

impl Session {
    pub fn new(mode: DisplayMode, config: SessionConfig) -> Self {
        let transport = HttpTransport::new(config.max_redirects);
        Self::with_parts(mode, config, transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> Session<T, C> {
    pub fn with_parts(mode: DisplayMode, config: SessionConfig, transport: T, clock: C) -> Self {
        Self {
            mode,
            config,
            transport,
            clock,
        }
    }

    /// Resolves the target, performs the transfer and builds the report.
    ///
    /// Conflicting target flags are rejected before the transport is
    /// touched. A failed transfer yields no report.
    pub async fn run(&mut self, target: &TargetFlags) -> Result<FormattedReport, Error> {
        let target = target.resolve()?;
        info!("testing with {} payload: {}", target.test_name(), target.url());

        let mut sink = open_sink(&target)?;
        let request = TransferRequest {
            url: target.url(),
            user_agent: &self.config.user_agent,
            follow_redirects: true,
        };

        let mut sampler = ProgressSampler::start(&self.clock);
        if self.config.show_progress {
            sampler = sampler.with_progress_bar(progress_bar());
        }

        let result = {
            let mut hook = |tick: TransferProgress| sampler.on_progress(tick);
            self.transport.perform(&request, &mut sink, &mut hook).await
        };
        let state = sampler.finish();
        drop(sink);

        if let Err(e) = result {
            error!("transfer failed: {}", e);
            return Err(e.into());
        }
        info!("transfer finished in {:?} s", state.elapsed_secs());
        Ok(build_report(&state, &self.mode))
    }
}

/// Formats every measured value; anything never established stays `None`.
pub fn build_report(state: &MeasurementState, mode: &DisplayMode) -> FormattedReport {
    let elapsed = state.elapsed_secs();
    FormattedReport {
        duration: elapsed
            .map(format_duration)
            .filter(|text| !text.is_empty()),
        total_size: format_known_size(state.total_bytes, mode),
        average_rate: format_average_rate(state.total_bytes, elapsed, mode),
        peak_rate: format_rate(state.most_bytes_per_sec, mode),
        lowest_rate: format_rate(state.least_bytes_per_sec, mode),
    }
}

/// Scratch file the payload is written to; removed when dropped.
fn open_sink(target: &TargetSelection) -> Result<NamedTempFile, TransferError> {
    let prefix = format!(".{}_{}-test_", PROGRAM_NAME, target.test_name());
    let sink = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile()
        .map_err(|e| TransferError::Init(format!("could not create download sink: {}", e)))?;
    info!("writing payload to {}", sink.path().display());
    Ok(sink)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}
