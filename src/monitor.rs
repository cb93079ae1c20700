use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, watch};

use crate::config::SeriesConfig;
use crate::error::PipelineError;
use crate::feed::{FeedEvent, ScanTracker, SelectedScan};
use crate::ingest::{ingest, RawSeries, SeriesFetcher};
use crate::series::{build_series, RenderSeries};

/// Where the chart stands from the consumer's point of view.
///
/// `NoScan` is the terminal-safe empty-feed state; it is distinct from
/// `Failed`, which always refers to an ingestion attempt for a selected
/// scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChartPhase {
    #[default]
    NoScan,
    Loading,
    Ready,
    Failed(String),
}

/// Consumer-visible snapshot of the pipeline. A failed ingestion keeps
/// the previously rendered `series`; a feed error keeps the last good
/// `scan`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonitorState {
    pub scan: Option<SelectedScan>,
    pub chart: ChartPhase,
    pub series: Option<RenderSeries>,
    pub feed_error: Option<String>,
}

/// Wires the scan tracker, ingestor, and series builder together on one
/// cooperative event loop and publishes [`MonitorState`] through a watch
/// channel.
///
/// Ingestions run as spawned tasks tagged with their originating data
/// URL; a completion whose URL no longer matches the currently selected
/// record is discarded, so the view always reflects the latest delivered
/// snapshot (last-snapshot-wins) no matter how fetches interleave.
pub struct ScanMonitor {
    tracker: ScanTracker,
    fetcher: Arc<dyn SeriesFetcher>,
    config: SeriesConfig,
    chart: ChartPhase,
    series: Option<RenderSeries>,
    state_tx: watch::Sender<MonitorState>,
}

impl ScanMonitor {
    pub fn new(
        fetcher: Arc<dyn SeriesFetcher>,
        config: SeriesConfig,
    ) -> (Self, watch::Receiver<MonitorState>) {
        let (state_tx, state_rx) = watch::channel(MonitorState::default());
        let monitor = Self {
            tracker: ScanTracker::new(),
            fetcher,
            config,
            chart: ChartPhase::default(),
            series: None,
            state_tx,
        };
        (monitor, state_rx)
    }

    /// Drives the monitor until the feed event channel closes.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<FeedEvent>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if let Some(url) = self.handle_event(event) {
                        let fetcher = Arc::clone(&self.fetcher);
                        let done = done_tx.clone();
                        tokio::spawn(async move {
                            let result = ingest(fetcher.as_ref(), &url).await;
                            // The loop may be gone by completion time.
                            let _ = done.send((url, result));
                        });
                    }
                }
                Some((url, result)) = done_rx.recv() => {
                    self.commit(&url, result);
                }
            }
        }
    }

    /// Applies one feed event and returns the data URL to ingest, if the
    /// selected scan's URL changed. Exposed so callers embedding the
    /// monitor in their own loop can drive it directly.
    pub fn handle_event(&mut self, event: FeedEvent) -> Option<String> {
        let trigger = self.tracker.apply_event(event);
        if self.tracker.current().is_none() {
            self.chart = ChartPhase::NoScan;
            self.series = None;
        } else if trigger.is_some() {
            // Keep the previous series visible while the new one loads.
            self.chart = ChartPhase::Loading;
        }
        self.publish();
        trigger
    }

    /// Commits one ingestion result. Results for a URL that is no longer
    /// the selected record's URL are dropped.
    pub fn commit(&mut self, url: &str, result: Result<RawSeries, PipelineError>) {
        if self.tracker.current_data_url() != Some(url) {
            debug!("discarding stale ingestion result for {url}");
            return;
        }
        match result {
            Ok(raw) => {
                self.series = Some(build_series(&raw, &self.config));
                self.chart = ChartPhase::Ready;
            }
            Err(err) => {
                // The previous series stays on screen.
                self.chart = ChartPhase::Failed(err.to_string());
            }
        }
        self.publish();
    }

    pub fn state(&self) -> MonitorState {
        MonitorState {
            scan: self.tracker.current().cloned(),
            chart: self.chart.clone(),
            series: self.series.clone(),
            feed_error: self.tracker.feed_error().map(str::to_string),
        }
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.state());
    }
}
