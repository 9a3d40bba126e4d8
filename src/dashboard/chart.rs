use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::types::{PredictionPoint, PricePoint};

/// One named line on a chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// Shared date axis; RFC 3339 via chrono's serde impl.
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<f64>,
    /// Shade the area down to the previous trace.
    pub fill: bool,
}

/// Declarative description of one actual-vs-predicted chart. The browser
/// side turns this into a plot; nothing here knows how to draw.
#[derive(Debug, Clone, Serialize)]
pub struct ChartFigure {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub series: Vec<ChartSeries>,
}

/// Build the two-trace overlay for a pair: actual targets first, then the
/// predicted series shaded beneath it.
pub fn build_figure(
    title: &str,
    actual: &[PricePoint],
    predicted: &[PredictionPoint],
) -> ChartFigure {
    let actual_series = ChartSeries {
        name: "Actual".to_string(),
        x: actual.iter().map(|p| p.timestamp).collect(),
        y: actual.iter().map(|p| p.close).collect(),
        fill: false,
    };
    let predicted_series = ChartSeries {
        name: "Predicted".to_string(),
        x: predicted.iter().map(|p| p.timestamp).collect(),
        y: predicted.iter().map(|p| p.close).collect(),
        fill: true,
    };

    ChartFigure {
        title: title.to_string(),
        x_title: "Date".to_string(),
        y_title: "Price (USD)".to_string(),
        series: vec![actual_series, predicted_series],
    }
}
