use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::error::PipelineError;

/// Two aligned numeric columns parsed from one scan document.
///
/// Every `(time[i], amplitude[i])` pair comes from one valid CSV data row;
/// rows with a non-numeric field in either column are dropped whole, so
/// the columns always stay the same length and in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSeries {
    pub time: Vec<f64>,
    pub amplitude: Vec<f64>,
}

impl RawSeries {
    pub fn len(&self) -> usize {
        self.time.len().min(self.amplitude.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transport for scan documents. Implementations only move bytes; parsing
/// is shared via [`parse_series`].
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    async fn fetch_csv(&self, url: &str) -> Result<String, PipelineError>;
}

/// HTTP transport over a process-wide `reqwest` client.
#[derive(Clone, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }

    fn client() -> &'static reqwest::Client {
        static CLIENT: OnceCell<reqwest::Client> = OnceCell::new();
        CLIENT.get_or_init(reqwest::Client::new)
    }
}

#[async_trait]
impl SeriesFetcher for HttpFetcher {
    async fn fetch_csv(&self, url: &str) -> Result<String, PipelineError> {
        let response = Self::client()
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(status.to_string()));
        }
        response
            .text()
            .await
            .map_err(|e| PipelineError::Decode(e.to_string()))
    }
}

/// Parses a scan document into a [`RawSeries`].
///
/// The first row is always treated as a header and discarded, regardless
/// of its content. Each remaining row contributes a pair only when column
/// 0 (time) and column 1 (amplitude) both parse as floats; NaN counts as
/// unparseable. Bad rows are dropped silently — only a document whose
/// data rows all fail to parse is an error. A header-only document yields
/// an empty series.
pub fn parse_series(text: &str) -> Result<RawSeries, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut series = RawSeries::default();
    let mut data_rows = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::Parse(e.to_string()))?;
        data_rows += 1;
        let time = record.get(0).and_then(parse_field);
        let amplitude = record.get(1).and_then(parse_field);
        if let (Some(time), Some(amplitude)) = (time, amplitude) {
            series.time.push(time);
            series.amplitude.push(amplitude);
        }
    }
    if data_rows > 0 && series.is_empty() {
        return Err(PipelineError::Parse(
            "no row contained numeric time and amplitude columns".to_string(),
        ));
    }
    Ok(series)
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Fetch and parse in one step; this is the unit of work the monitor
/// spawns per selected scan.
pub async fn ingest(fetcher: &dyn SeriesFetcher, url: &str) -> Result<RawSeries, PipelineError> {
    let text = fetcher.fetch_csv(url).await?;
    parse_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_rows_are_dropped_whole() {
        let doc = "t,a\n1,2\nx,3\n4,y\n5,6\n";
        let series = parse_series(doc).unwrap();
        assert_eq!(series.time, vec![1.0, 5.0]);
        assert_eq!(series.amplitude, vec![2.0, 6.0]);
    }

    #[test]
    fn first_row_is_discarded_even_when_numeric() {
        let doc = "10,20\n1,2\n";
        let series = parse_series(doc).unwrap();
        assert_eq!(series.time, vec![1.0]);
        assert_eq!(series.amplitude, vec![2.0]);
    }

    #[test]
    fn columns_stay_aligned_and_ordered() {
        let doc = "t,a\n3,30\n1,10\n2,20\n";
        let series = parse_series(doc).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.time, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn nan_fields_count_as_unparseable() {
        let doc = "t,a\nNaN,1\n2,3\n";
        let series = parse_series(doc).unwrap();
        assert_eq!(series.time, vec![2.0]);
    }

    #[test]
    fn short_rows_are_dropped() {
        let doc = "t,a\n1\n2,3\n";
        let series = parse_series(doc).unwrap();
        assert_eq!(series.time, vec![2.0]);
        assert_eq!(series.amplitude, vec![3.0]);
    }

    #[test]
    fn header_only_document_is_empty_not_an_error() {
        let series = parse_series("t,a\n").unwrap();
        assert!(series.is_empty());
        assert!(parse_series("").unwrap().is_empty());
    }

    #[test]
    fn fully_malformed_document_is_an_error() {
        let doc = "t,a\nx,y\nfoo,bar\n";
        assert!(matches!(
            parse_series(doc),
            Err(PipelineError::Parse(_))
        ));
    }
}
