// Placefile service - The polling loop: wait, fetch, render, write
use crate::application::formatter::{format_datetime, render};
use crate::application::scheduler::Ticker;
use crate::application::state_source::StateVectorSource;
use crate::domain::placefile::{AircraftStatus, PlacefileHeader};
use crate::domain::state_vector::Snapshot;
use crate::infrastructure::placefile_writer::PlacefileWriter;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Counts for one written placefile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub received: usize,
    pub rendered: usize,
    /// Records without a position
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Written(CycleReport),
    /// The fetch timed out, the placefile was left as it was
    TimedOut,
}

pub struct PlacefileService {
    source: Arc<dyn StateVectorSource>,
    writer: PlacefileWriter,
    icon_path: PathBuf,
    ticker: Ticker,
    outcomes: Option<mpsc::UnboundedSender<CycleOutcome>>,
}

impl PlacefileService {
    pub fn new(
        source: Arc<dyn StateVectorSource>,
        writer: PlacefileWriter,
        icon_path: PathBuf,
        ticker: Ticker,
    ) -> Self {
        Self {
            source,
            writer,
            icon_path,
            ticker,
            outcomes: None,
        }
    }

    /// Report the outcome of every cycle on `tx`
    pub fn with_outcomes(mut self, tx: mpsc::UnboundedSender<CycleOutcome>) -> Self {
        self.outcomes = Some(tx);
        self
    }

    /// Poll until `cancel` fires (`Ok`) or the source fails with a
    /// non-transient error (`Err`).
    ///
    /// Cancellation is only observed while sleeping or fetching. Rendering and
    /// writing contain no await point, so a cycle that got its snapshot always
    /// finishes its write.
    pub async fn run(&self, cancel: &CancellationToken) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = self.ticker.interval().as_secs(),
            path = %self.writer.path().display(),
            "Polling loop started"
        );

        loop {
            let delay = self.ticker.until_next(Instant::now());
            tracing::trace!(delay_ms = delay.as_millis() as u64, "Waiting for next tick");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Shutdown requested while waiting");
                    return Ok(());
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Shutdown requested while fetching");
                    return Ok(());
                }
                outcome = self.run_cycle() => outcome?,
            };

            if let Some(tx) = &self.outcomes {
                let _ = tx.send(outcome);
            }
        }
    }

    /// Fetch one snapshot and replace the placefile with it.
    ///
    /// A timeout yields `CycleOutcome::TimedOut`. Any other fetch error and any
    /// write error is returned.
    pub async fn run_cycle(&self) -> anyhow::Result<CycleOutcome> {
        match self.source.fetch_states().await {
            Ok(snapshot) => Ok(CycleOutcome::Written(self.publish(&snapshot)?)),
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "There was a timeout...trying again.");
                Ok(CycleOutcome::TimedOut)
            }
            Err(e) => {
                tracing::error!(error = %e, "Fetching state vectors failed");
                Err(e.into())
            }
        }
    }

    fn publish(&self, snapshot: &Snapshot) -> anyhow::Result<CycleReport> {
        // one offset per cycle, taken from the current local time
        let now = Local::now().fixed_offset();
        let utc_offset = *now.offset();
        let reference_time = now.timestamp();

        let blocks: Vec<_> = snapshot
            .states
            .iter()
            .filter_map(|state| render(state, reference_time, utc_offset))
            .collect();

        let header = PlacefileHeader::new(format_datetime(now), self.icon_path.clone());
        self.writer.write(&header, &blocks)?;

        let report = CycleReport {
            received: snapshot.states.len(),
            rendered: blocks.len(),
            skipped: snapshot.states.len() - blocks.len(),
        };
        tracing::info!(
            snapshot_time = snapshot.time,
            received = report.received,
            rendered = report.rendered,
            skipped = report.skipped,
            grounded = blocks.iter().filter(|b| b.status == AircraftStatus::Grounded).count(),
            "Placefile updated"
        );
        Ok(report)
    }
}
