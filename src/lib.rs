//! Live scan telemetry pipeline.
//!
//! Tracks "the current scan" from a push-based snapshot feed, ingests the
//! scan's CSV payload over HTTP, reduces it to a bounded render-ready
//! series, and maps interactive probe positions back to data values.
//! Rendering itself is a collaborator's job: the crate hands out
//! [`series::RenderSeries`] values and consumes the surface's
//! [`probe::CoordinateMap`].

pub mod config;
pub mod downsample;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod monitor;
pub mod probe;
pub mod series;

pub use config::{PipelineConfig, SeriesConfig};
pub use downsample::downsample;
pub use error::PipelineError;
pub use feed::{
    FeedEvent, FeedSubscription, ManualFeed, ScanRecord, ScanTracker, SelectedScan, Snapshot,
    SnapshotFeed,
};
pub use ingest::{ingest, parse_series, HttpFetcher, RawSeries, SeriesFetcher};
pub use monitor::{ChartPhase, MonitorState, ScanMonitor};
pub use probe::{CoordinateMap, LinearMap, ProbeMapper, ProbeState};
pub use series::{build_series, RenderPoint, RenderSeries};
