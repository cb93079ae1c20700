//! Headless demo: a simulated feed publishes successive scans whose CSV
//! payloads are damped sinusoids, and the monitor's state transitions are
//! printed as they happen.
//!
//! Run with `RUST_LOG=debug` to see selection and stale-discard logging.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use echoscan::{
    ChartPhase, ManualFeed, MonitorState, PipelineConfig, PipelineError, ScanMonitor, ScanRecord,
    SeriesFetcher, Snapshot, SnapshotFeed,
};
use tokio::sync::mpsc;

/// Serves synthesized scan documents instead of hitting the network.
struct SimFetcher {
    documents: HashMap<String, String>,
}

#[async_trait]
impl SeriesFetcher for SimFetcher {
    async fn fetch_csv(&self, url: &str) -> Result<String, PipelineError> {
        // A little latency so snapshots can overtake fetches.
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Fetch("404 Not Found".to_string()))
    }
}

/// Damped sinusoid over 0..10 kHz, 250 rows.
fn scan_document(amplitude: f64, decay: f64) -> String {
    let mut doc = String::from("frequency,amplitude\n");
    for i in 0..250 {
        let f = i as f64 * 40.0;
        let a = amplitude * (-f / decay).exp() * (f / 500.0).sin();
        doc.push_str(&format!("{f},{a:.6}\n"));
    }
    doc
}

fn describe(state: &MonitorState) -> String {
    let scan = state
        .scan
        .as_ref()
        .map(|s| s.id.as_str())
        .unwrap_or("<none>");
    let points = state
        .series
        .as_ref()
        .map(|s| s.points.len())
        .unwrap_or(0);
    match &state.chart {
        ChartPhase::NoScan => format!("scan={scan} chart=no-scan"),
        ChartPhase::Loading => format!("scan={scan} chart=loading points={points}"),
        ChartPhase::Ready => {
            let width = state.series.as_ref().map(|s| s.width_hint).unwrap_or(0.0);
            format!("scan={scan} chart=ready points={points} width={width}px")
        }
        ChartPhase::Failed(msg) => format!("scan={scan} chart=failed ({msg}) points={points}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let config = PipelineConfig::default();

    let mut documents = HashMap::new();
    documents.insert("sim://scan/1".to_string(), scan_document(300.0, 2000.0));
    documents.insert("sim://scan/2".to_string(), scan_document(250.0, 1500.0));

    let (monitor, mut state_rx) =
        ScanMonitor::new(Arc::new(SimFetcher { documents }), config.series);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let feed = ManualFeed::new();
    let subscription = feed.subscribe(&config.feed_path, events_tx);
    let monitor_handle = tokio::spawn(monitor.run(events_rx));

    let printer = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            println!("{}", describe(&state_rx.borrow_and_update()));
        }
    });

    // Scans arrive one after another; the second snapshot also carries a
    // quality label that rides along untouched.
    feed.emit(&config.feed_path, Some(Snapshot::new()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut snapshot = Snapshot::new();
    snapshot.insert("scan_1".to_string(), ScanRecord::new("sim://scan/1"));
    feed.emit(&config.feed_path, Some(snapshot.clone()));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut record = ScanRecord::new("sim://scan/2");
    record
        .quality
        .insert("quality".to_string(), "Damaged".into());
    snapshot.insert("scan_2".to_string(), record);
    feed.emit(&config.feed_path, Some(snapshot.clone()));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // A scan pointing at a missing document: the chart reports failure
    // but the previous series stays available.
    snapshot.insert("scan_3".to_string(), ScanRecord::new("sim://scan/missing"));
    feed.emit(&config.feed_path, Some(snapshot));
    tokio::time::sleep(Duration::from_millis(200)).await;

    drop(subscription);
    drop(feed);
    monitor_handle.await?;
    printer.await?;
    Ok(())
}
