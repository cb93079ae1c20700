use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One scan record as stored at the remote feed. Anything beyond the data
/// URL (quality labels, classification results, operator notes) is passed
/// through untouched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub data_url: String,
    #[serde(flatten)]
    pub quality: serde_json::Map<String, serde_json::Value>,
}

impl ScanRecord {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
            quality: serde_json::Map::new(),
        }
    }
}

/// Full value at the feed path: record id -> record. A BTreeMap keeps
/// iteration order deterministic, which makes ordinal ties resolve the
/// same way on every run.
pub type Snapshot = BTreeMap<String, ScanRecord>;

/// Events pushed by a snapshot feed.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    /// The full current value at the subscribed path; `None` when the
    /// path is absent.
    Snapshot(Option<Snapshot>),
    /// Subscription transport failure. Non-fatal: the tracker keeps its
    /// last good value.
    Error(String),
}

/// A push-based source that delivers the full value at a path whenever it
/// changes.
pub trait SnapshotFeed {
    /// Starts delivering events for `path` into `sender`. The returned
    /// guard owns the subscription.
    fn subscribe(
        &self,
        path: &str,
        sender: mpsc::UnboundedSender<FeedEvent>,
    ) -> Box<dyn FeedSubscription>;
}

/// Handle for one live subscription. `unsubscribe` is idempotent and also
/// runs on drop; deliveries racing a release are dropped, never a panic.
pub trait FeedSubscription: Send {
    fn unsubscribe(&mut self);
}

struct Listener {
    path: String,
    sender: mpsc::UnboundedSender<FeedEvent>,
    active: Arc<AtomicBool>,
}

/// In-memory feed for tests and deterministic playback.
#[derive(Clone, Default)]
pub struct ManualFeed {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl ManualFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a snapshot to every live subscriber of `path`.
    pub fn emit(&self, path: &str, snapshot: Option<Snapshot>) {
        self.broadcast(path, FeedEvent::Snapshot(snapshot));
    }

    /// Pushes a transport error to every live subscriber of `path`.
    pub fn emit_error(&self, path: &str, message: impl Into<String>) {
        self.broadcast(path, FeedEvent::Error(message.into()));
    }

    fn broadcast(&self, path: &str, event: FeedEvent) {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.retain(|l| l.active.load(Ordering::Acquire));
        for listener in listeners.iter().filter(|l| l.path == path) {
            // A receiver dropped mid-delivery is a no-op.
            let _ = listener.sender.send(event.clone());
        }
    }
}

impl SnapshotFeed for ManualFeed {
    fn subscribe(
        &self,
        path: &str,
        sender: mpsc::UnboundedSender<FeedEvent>,
    ) -> Box<dyn FeedSubscription> {
        let active = Arc::new(AtomicBool::new(true));
        self.listeners.lock().unwrap().push(Listener {
            path: path.to_string(),
            sender,
            active: active.clone(),
        });
        Box::new(ManualSubscription { active })
    }
}

struct ManualSubscription {
    active: Arc<AtomicBool>,
}

impl FeedSubscription for ManualSubscription {
    fn unsubscribe(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// The record chosen from one snapshot: the id with the numerically
/// largest ordinal suffix.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedScan {
    pub id: String,
    pub ordinal: i64,
    pub record: ScanRecord,
}

/// Tracks "the current scan" across snapshot events and decides when the
/// downstream ingestion has to re-run.
///
/// The trigger contract: remember the previously selected record's data
/// URL and report a new ingest target only when the URL actually changes,
/// so unrelated feed churn (quality edits, new metadata) does not cause a
/// redundant re-fetch.
#[derive(Debug, Default)]
pub struct ScanTracker {
    current: Option<SelectedScan>,
    feed_error: Option<String>,
}

impl ScanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SelectedScan> {
        self.current.as_ref()
    }

    pub fn current_data_url(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.record.data_url.as_str())
    }

    pub fn feed_error(&self) -> Option<&str> {
        self.feed_error.as_deref()
    }

    /// Applies one feed event. Returns the data URL to ingest when the
    /// selected record's URL changed.
    pub fn apply_event(&mut self, event: FeedEvent) -> Option<String> {
        match event {
            FeedEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            FeedEvent::Error(message) => {
                // Availability over freshness: keep the last good scan.
                debug!("feed error, retaining current scan: {message}");
                self.feed_error = Some(message);
                None
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Option<Snapshot>) -> Option<String> {
        self.feed_error = None;
        let selected = snapshot.as_ref().and_then(select_latest);
        match selected {
            None => {
                // Empty or absent feed path: no current scan, nothing to
                // ingest. Terminal-safe, not an error.
                self.current = None;
                None
            }
            Some(selected) => {
                let url_changed = self.current_data_url() != Some(selected.record.data_url.as_str());
                if url_changed {
                    info!("selected scan {} (ordinal {})", selected.id, selected.ordinal);
                }
                let url = selected.record.data_url.clone();
                self.current = Some(selected);
                url_changed.then_some(url)
            }
        }
    }
}

/// Picks the record whose id carries the numerically largest ordinal
/// suffix. Ids whose suffix does not parse rank below every parseable
/// ordinal; only strictly greater ordinals replace the running choice, so
/// ties go to the first key in sorted order.
fn select_latest(snapshot: &Snapshot) -> Option<SelectedScan> {
    let mut best: Option<SelectedScan> = None;
    for (id, record) in snapshot {
        let ordinal = ordinal_of(id);
        let replace = match &best {
            None => true,
            Some(current) => ordinal > current.ordinal,
        };
        if replace {
            best = Some(SelectedScan {
                id: id.clone(),
                ordinal,
                record: record.clone(),
            });
        }
    }
    best
}

/// Parses the substring after the last `_` as the record's ordinal;
/// unparseable suffixes rank as `i64::MIN`.
fn ordinal_of(id: &str) -> i64 {
    id.rsplit('_')
        .next()
        .and_then(|suffix| suffix.parse::<i64>().ok())
        .unwrap_or(i64::MIN)
}
