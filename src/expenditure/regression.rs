//! Least-squares weight trend
//!
//! Fits `weight = slope * day + intercept` where `day` is a continuous day
//! offset from the Unix epoch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::WeightSample;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days since the Unix epoch
pub fn day_offset(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Fitted trend line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    /// Change per day
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Ordinary least squares over `(x, y)` points.
    ///
    /// Sums are taken about the mean x, which is algebraically the same as
    /// `(nΣxy − ΣxΣy) / (nΣx² − (Σx)²)` but keeps precision with epoch-sized x
    /// values. Fewer than two points, or points that all share one x, are
    /// rejected instead of dividing by zero.
    pub fn fit(points: &[(f64, f64)]) -> TrackerResult<Self> {
        if points.len() < 2 {
            return Err(TrackerError::DegenerateRegression {
                samples: points.len(),
            });
        }

        let first_x = points[0].0;
        if points.iter().all(|(x, _)| *x == first_x) {
            return Err(TrackerError::DegenerateRegression {
                samples: points.len(),
            });
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        if sxx.abs() < f64::EPSILON {
            return Err(TrackerError::DegenerateRegression {
                samples: points.len(),
            });
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        Ok(Self { slope, intercept })
    }

    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Trend over a set of weight samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightTrend {
    pub line: TrendLine,
    pub first_day: f64,
    pub last_day: f64,
    /// Modeled change between the first and last sample
    pub regression_difference: f64,
}

/// Fit a trend through the samples and measure its change between the
/// earliest and latest sample
pub fn weight_trend(samples: &[WeightSample]) -> TrackerResult<WeightTrend> {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (day_offset(s.created), s.weight_lbs))
        .collect();

    let line = TrendLine::fit(&points)?;

    let first_day = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let last_day = points
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(WeightTrend {
        line,
        first_day,
        last_day,
        regression_difference: line.value_at(last_day) - line.value_at(first_day),
    })
}
