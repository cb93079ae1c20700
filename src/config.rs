use serde::{Deserialize, Serialize};

/// Tunables for turning a raw series into a renderable one.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Upper bound on the number of rendered points per series.
    pub target_points: usize,
    /// Horizontal pixels allotted per rendered point.
    pub unit_width: f32,
    /// Columns visible at once; longer series scroll instead of stretching.
    pub max_visible_columns: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            target_points: 100,
            unit_width: 35.0,
            max_visible_columns: 10,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path of the scan snapshot feed at the remote store.
    pub feed_path: String,
    pub series: SeriesConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feed_path: "Scans".to_string(),
            series: SeriesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_render_constants() {
        let cfg = SeriesConfig::default();
        assert_eq!(cfg.target_points, 100);
        assert_eq!(cfg.unit_width, 35.0);
        assert_eq!(cfg.max_visible_columns, 10);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"series": {"target_points": 50}}"#).unwrap();
        assert_eq!(cfg.feed_path, "Scans");
        assert_eq!(cfg.series.target_points, 50);
        assert_eq!(cfg.series.max_visible_columns, 10);
    }
}
