use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One daily observation: close price at a UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// One model prediction, de-normalized back to price scale and aligned
/// with the actual observation it targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamp at index {0} is not strictly after its predecessor")]
    NonMonotonic(usize),
    #[error("negative close price at index {0}")]
    NegativeClose(usize),
}

/// An ordered daily close-price series. Timestamps are strictly increasing
/// and closes are non-negative; both are enforced at construction, and the
/// series is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (i, window) in points.windows(2).enumerate() {
            if window[1].timestamp <= window[0].timestamp {
                return Err(SeriesError::NonMonotonic(i + 1));
            }
        }
        if let Some(i) = points.iter().position(|p| p.close < 0.0) {
            return Err(SeriesError::NegativeClose(i));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
