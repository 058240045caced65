use std::fmt;

use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;
use statrs::statistics::{Data, Distribution, Median};

use crate::error::{AnalysisError, Result};
use crate::models::{Column, Dataset, Keyed};

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Summary {
    pub(crate) column: &'static str,
    pub(crate) count: usize,
    pub(crate) mean: f64,
    pub(crate) median: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    /// Sample standard deviation (n - 1), NaN for a single value
    pub(crate) std_dev: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<4} n={:<3} mean={:.4} median={:.4} min={:.4} max={:.4} sd={:.5}",
            self.column, self.count, self.mean, self.median, self.min, self.max, self.std_dev
        )
    }
}

// Mean, median, min, max and standard deviation of a column
pub(crate) fn describe(column: &'static str, values: &[f64]) -> Result<Summary> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyColumn { column });
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(AnalysisError::NonNumericColumn { column });
    }

    let array = Array1::from(values.to_vec());
    let min = *array
        .min()
        .map_err(|_| AnalysisError::NonNumericColumn { column })?;
    let max = *array
        .max()
        .map_err(|_| AnalysisError::NonNumericColumn { column })?;

    let stats = Data::new(values.to_vec());
    let mean = stats.mean().ok_or(AnalysisError::EmptyColumn { column })?;
    let std_dev = if values.len() > 1 {
        stats.std_dev().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    };

    Ok(Summary {
        column,
        count: values.len(),
        mean,
        median: stats.median(),
        min,
        max,
        std_dev,
    })
}

pub(crate) fn describe_column<R: Keyed>(data: &Dataset<R>, column: Column) -> Result<Summary> {
    describe(column.name(), &data.column(column)?)
}

/// Pearson correlation and its square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Correlation {
    pub(crate) r: f64,
    pub(crate) r_squared: f64,
}

impl Correlation {
    fn new(r: f64) -> Self {
        Correlation { r, r_squared: r * r }
    }
}

// Helper function to calculate correlation
pub(crate) fn calculate_correlation(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let numerator = x.iter().zip(y.iter()).map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean)).sum::<f64>();
    let denominator_x = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum::<f64>().sqrt();
    let denominator_y = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum::<f64>().sqrt();
    if denominator_x > 0.0 && denominator_y > 0.0 {
        // rounding can push |r| a hair past 1
        Some((numerator / (denominator_x * denominator_y)).clamp(-1.0, 1.0))
    } else {
        None
    }
}

pub(crate) fn correlation(x: &[f64], y: &[f64]) -> Option<Correlation> {
    calculate_correlation(&ArrayView1::from(x), &ArrayView1::from(y)).map(Correlation::new)
}

/// Correlation between two columns of a dataset.
pub(crate) fn correlate<R: Keyed>(data: &Dataset<R>, x: Column, y: Column) -> Result<Correlation> {
    let xs = data.column(x)?;
    let ys = data.column(y)?;
    correlation(&xs, &ys).ok_or(AnalysisError::UndefinedCorrelation {
        x: x.name(),
        y: y.name(),
    })
}
