use serde::Deserialize;
use thiserror::Error;

use crate::data::types::{PredictionPoint, PricePoint, PriceSeries};

/// Which observation a window predicts.
///
/// The trained models disagree on this convention, so it is an explicit
/// configuration choice rather than a hardcoded constant: `WindowEnd`
/// targets the window's own last day, `NextDay` the day after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOffset {
    #[default]
    WindowEnd,
    NextDay,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Days per input window (W).
    pub length: usize,
    #[serde(default)]
    pub target_offset: TargetOffset,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            length: 10,
            target_offset: TargetOffset::default(),
        }
    }
}

impl WindowConfig {
    /// Index of window k's target within the source series: k + shift.
    fn target_shift(&self) -> usize {
        match self.target_offset {
            TargetOffset::WindowEnd => self.length - 1,
            TargetOffset::NextDay => self.length,
        }
    }

    /// Number of windows a series of length `n` yields.
    fn window_count(&self, n: usize) -> usize {
        n.saturating_sub(self.length)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("zero anchor price at series index {0}; window cannot be zero-based")]
    ZeroAnchor(usize),
    #[error("got {got} predictions for a series yielding {expected} windows")]
    LengthMismatch { got: usize, expected: usize },
}

/// A model input window: prices expressed relative to the window's first
/// price. Ephemeral, lives only for the duration of a prediction call.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWindow(pub Vec<f64>);

impl NormalizedWindow {
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Express each price relative to the first one: `out[i] = p[i] / p[0] - 1`.
///
/// The first element is exactly 0. A zero anchor has no defined relative
/// scale and is rejected rather than producing infinities.
pub fn normalize_zero_base(prices: &[f64]) -> Result<Vec<f64>, WindowError> {
    let Some(&anchor) = prices.first() else {
        return Ok(Vec::new());
    };
    if anchor == 0.0 {
        return Err(WindowError::ZeroAnchor(0));
    }
    Ok(prices.iter().map(|p| p / anchor - 1.0).collect())
}

/// Slice a series into its `N - W` consecutive zero-based windows, in index
/// order. A series with `N <= W` yields no windows; that is "insufficient
/// data", not a failure.
pub fn extract_windows(
    series: &PriceSeries,
    cfg: &WindowConfig,
) -> Result<Vec<NormalizedWindow>, WindowError> {
    let closes: Vec<f64> = series.closes().collect();
    let count = cfg.window_count(closes.len());

    let mut windows = Vec::with_capacity(count);
    for k in 0..count {
        let normalized = normalize_zero_base(&closes[k..k + cfg.length])
            .map_err(|_| WindowError::ZeroAnchor(k))?;
        windows.push(NormalizedWindow(normalized));
    }
    Ok(windows)
}

/// Map raw model outputs (relative returns) back to absolute prices.
///
/// Prediction k is anchored on the same price its window was normalized
/// against, `close[k]`, and stamped with its target day's timestamp so the
/// predicted series overlays the actual one directly.
pub fn denormalize(
    predicted_returns: &[f64],
    series: &PriceSeries,
    cfg: &WindowConfig,
) -> Result<Vec<PredictionPoint>, WindowError> {
    let expected = cfg.window_count(series.len());
    if predicted_returns.len() != expected {
        return Err(WindowError::LengthMismatch {
            got: predicted_returns.len(),
            expected,
        });
    }

    let points = series.points();
    let shift = cfg.target_shift();

    Ok(predicted_returns
        .iter()
        .enumerate()
        .map(|(k, ret)| PredictionPoint {
            timestamp: points[k + shift].timestamp,
            close: points[k].close * (ret + 1.0),
        })
        .collect())
}

/// The actual observations the predictions target, aligned index-for-index
/// with the output of [`denormalize`].
pub fn target_points<'a>(series: &'a PriceSeries, cfg: &WindowConfig) -> &'a [PricePoint] {
    let count = cfg.window_count(series.len());
    if count == 0 {
        return &[];
    }
    let shift = cfg.target_shift();
    &series.points()[shift..shift + count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::PricePoint;
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn cfg(length: usize, target_offset: TargetOffset) -> WindowConfig {
        WindowConfig {
            length,
            target_offset,
        }
    }

    #[test]
    fn test_normalize_first_element_is_zero() {
        let out = normalize_zero_base(&[100.0, 102.0, 99.0]).unwrap();
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.02).abs() < 1e-12);
        assert!((out[2] + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_anchor_is_an_error() {
        assert_eq!(
            normalize_zero_base(&[0.0, 1.0]).unwrap_err(),
            WindowError::ZeroAnchor(0)
        );
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(normalize_zero_base(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_extract_window_count() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let windows = extract_windows(&s, &cfg(4, TargetOffset::WindowEnd)).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].values().len(), 4);
    }

    #[test]
    fn test_extract_eleven_price_series() {
        // 11 prices, W=10: exactly one window.
        let s = series(&[
            100.0, 102.0, 99.0, 105.0, 101.0, 98.0, 97.0, 103.0, 106.0, 110.0, 108.0,
        ]);
        let windows = extract_windows(&s, &cfg(10, TargetOffset::WindowEnd)).unwrap();

        assert_eq!(windows.len(), 1);
        let w = windows[0].values();
        assert_eq!(w.len(), 10);
        assert_eq!(w[0], 0.0);
        assert!((w[1] - 0.02).abs() < 1e-12);
        assert!((w[9] - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_extract_short_series_is_empty() {
        let config = cfg(10, TargetOffset::WindowEnd);
        assert!(extract_windows(&series(&[]), &config).unwrap().is_empty());
        assert!(extract_windows(&series(&[100.0]), &config).unwrap().is_empty());
        // N == W is still insufficient; a window needs a target.
        let exact = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert!(extract_windows(&exact, &config).unwrap().is_empty());
    }

    #[test]
    fn test_extract_zero_anchor_reports_window_index() {
        let s = series(&[1.0, 2.0, 0.0, 3.0, 4.0, 5.0]);
        let err = extract_windows(&s, &cfg(3, TargetOffset::WindowEnd)).unwrap_err();
        assert_eq!(err, WindowError::ZeroAnchor(2));
    }

    #[test]
    fn test_denormalize_reconstructs_absolute_price() {
        // Relative return 0.05 on anchor 100 reconstructs 105.
        let s = series(&[100.0, 1.0, 2.0, 3.0]);
        let preds = denormalize(&[0.05], &s, &cfg(3, TargetOffset::WindowEnd)).unwrap();
        assert_eq!(preds.len(), 1);
        assert!((preds[0].close - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_denormalize_round_trip() {
        let closes = [100.0, 102.0, 99.0, 105.0, 101.0];
        let s = series(&closes);
        let config = cfg(3, TargetOffset::WindowEnd);

        // Feed back the true relative return of each target day.
        let shift = 2; // W - 1
        let true_returns: Vec<f64> = (0..2).map(|k| closes[k + shift] / closes[k] - 1.0).collect();
        let preds = denormalize(&true_returns, &s, &config).unwrap();

        for (pred, &expected) in preds.iter().zip(&closes[shift..]) {
            assert!((pred.close - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_alignment_window_end() {
        let s = series(&[100.0, 102.0, 99.0, 105.0, 101.0]);
        let config = cfg(3, TargetOffset::WindowEnd);

        let preds = denormalize(&[0.0, 0.0], &s, &config).unwrap();
        let targets = target_points(&s, &config);

        assert_eq!(preds.len(), targets.len());
        // Window 0 covers days 0..2 and targets day 2, its own last day.
        assert_eq!(preds[0].timestamp, s.points()[2].timestamp);
        for (pred, target) in preds.iter().zip(targets) {
            assert_eq!(pred.timestamp, target.timestamp);
        }
    }

    #[test]
    fn test_alignment_next_day() {
        let s = series(&[100.0, 102.0, 99.0, 105.0, 101.0]);
        let config = cfg(3, TargetOffset::NextDay);

        let preds = denormalize(&[0.0, 0.0], &s, &config).unwrap();
        let targets = target_points(&s, &config);

        assert_eq!(preds.len(), 2);
        // Window 0 covers days 0..2 and targets day 3.
        assert_eq!(preds[0].timestamp, s.points()[3].timestamp);
        assert_eq!(preds[1].timestamp, s.points()[4].timestamp);
        for (pred, target) in preds.iter().zip(targets) {
            assert_eq!(pred.timestamp, target.timestamp);
        }
    }

    #[test]
    fn test_denormalize_length_mismatch() {
        let s = series(&[100.0, 102.0, 99.0, 105.0, 101.0]);
        let err = denormalize(&[0.0], &s, &cfg(3, TargetOffset::WindowEnd)).unwrap_err();
        assert_eq!(err, WindowError::LengthMismatch { got: 1, expected: 2 });
    }

    #[test]
    fn test_target_points_short_series_is_empty() {
        let s = series(&[100.0]);
        assert!(target_points(&s, &cfg(10, TargetOffset::WindowEnd)).is_empty());
    }
}
