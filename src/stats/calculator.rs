//! Statistics Calculator Module
//! Descriptive statistics, correlations and density curves for the
//! analysis widgets.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};
use std::collections::BTreeMap;

use crate::data::filter::text_values;
use crate::data::loader;

/// Eight-number summary of a value series: count, mean, sample standard
/// deviation, minimum, quartiles and maximum.
#[derive(Debug, Clone)]
pub struct ValueSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for ValueSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Histogram of a value series with equal-width bins.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub bin_width: f64,
    /// (bin center, count) pairs.
    pub bars: Vec<(f64, f64)>,
}

/// Pearson correlation matrix over numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `values[i][j]` correlates `labels[i]` with `labels[j]`.
    pub values: Vec<Vec<f64>>,
}

/// Handles statistical calculations for the dashboard.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute the eight-number summary of a slice of values.
    pub fn summarize(values: &[f64]) -> ValueSummary {
        let n = values.len();
        if n == 0 {
            return ValueSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        ValueSummary {
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Non-null numeric values of a column, coerced to f64.
    pub fn numeric_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<f64>> {
        let col = df.column(column)?.cast(&DataType::Float64)?;
        let ca = col.f64()?;
        Ok(ca.into_iter().flatten().filter(|v| !v.is_nan()).collect())
    }

    /// Values of `value_col` grouped by the text values of `group_col`,
    /// sorted by group name. Rows with a null in either column are skipped.
    pub fn values_by_group(
        df: &DataFrame,
        group_col: &str,
        value_col: &str,
    ) -> PolarsResult<Vec<(String, Vec<f64>)>> {
        let groups = text_values(df, group_col)?;
        let col = df.column(value_col)?.cast(&DataType::Float64)?;
        let ca = col.f64()?;

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (i, group) in groups.into_iter().enumerate() {
            let (Some(group), Some(value)) = (group, ca.get(i)) else {
                continue;
            };
            if !value.is_nan() {
                grouped.entry(group).or_default().push(value);
            }
        }
        Ok(grouped.into_iter().collect())
    }

    /// Per-group summaries, computed across groups in parallel.
    pub fn group_summaries(
        df: &DataFrame,
        group_col: &str,
        value_col: &str,
    ) -> PolarsResult<Vec<(String, ValueSummary)>> {
        let grouped = Self::values_by_group(df, group_col, value_col)?;
        Ok(grouped
            .par_iter()
            .map(|(name, values)| (name.clone(), Self::summarize(values)))
            .collect())
    }

    /// Equal-width histogram over the value range.
    pub fn histogram(values: &[f64], bins: usize) -> Histogram {
        if values.is_empty() || bins == 0 {
            return Histogram {
                bin_width: 1.0,
                bars: Vec::new(),
            };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            return Histogram {
                bin_width: 1.0,
                bars: vec![(min, values.len() as f64)],
            };
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0.0_f64; bins];
        for &v in values {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1.0;
        }

        Histogram {
            bin_width: width,
            bars: counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| (min + (i as f64 + 0.5) * width, count))
                .collect(),
        }
    }

    /// Gaussian kernel density estimate sampled at `points` positions
    /// across the value range (Scott's bandwidth). Returns density, not
    /// counts; empty when the data carries no spread.
    pub fn kde_curve(values: &[f64], points: usize) -> Vec<[f64; 2]> {
        let n = values.len();
        if n < 2 || points < 2 {
            return Vec::new();
        }

        let summary = Self::summarize(values);
        if !(summary.std > 0.0) {
            return Vec::new();
        }
        let bandwidth = summary.std * (n as f64).powf(-0.2);

        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let lo = summary.min - 2.0 * bandwidth;
        let hi = summary.max + 2.0 * bandwidth;
        let step = (hi - lo) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let x = lo + i as f64 * step;
                let density = values
                    .iter()
                    .map(|&xi| kernel.pdf((x - xi) / bandwidth))
                    .sum::<f64>()
                    / (n as f64 * bandwidth);
                [x, density]
            })
            .collect()
    }

    /// Pearson correlation matrix across the numeric columns, using
    /// pairwise complete observations. `None` when no numeric column
    /// exists.
    pub fn correlation_matrix(df: &DataFrame) -> PolarsResult<Option<CorrelationMatrix>> {
        let labels = loader::numeric_columns(df);
        if labels.is_empty() {
            return Ok(None);
        }

        let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(labels.len());
        for label in &labels {
            let col = df.column(label)?.cast(&DataType::Float64)?;
            let ca = col.f64()?;
            columns.push(ca.into_iter().collect());
        }

        let values = (0..labels.len())
            .map(|i| {
                (0..labels.len())
                    .map(|j| pearson(&columns[i], &columns[j]))
                    .collect()
            })
            .collect();

        Ok(Some(CorrelationMatrix { labels, values }))
    }
}

/// Pearson correlation of two columns over rows where both are present.
/// NaN when fewer than two complete pairs exist or a column is constant.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((*x, *y)),
            _ => None,
        })
        .collect();

    let n = pairs.len() as f64;
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_summary_of_known_values() {
        let summary = StatsCalculator::summarize(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(summary.count, 4);
        assert!((summary.mean - 2.5).abs() < 1e-12);
        assert!((summary.median - 2.5).abs() < 1e-12);
        assert!((summary.q25 - 1.75).abs() < 1e-12);
        assert!((summary.q75 - 3.25).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        // Sample std of 1..4 is sqrt(5/3).
        assert!((summary.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_empty_slice() {
        let summary = StatsCalculator::summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [10.0, 20.0, 30.0];
        assert!((StatsCalculator::percentile(&sorted, 50.0) - 20.0).abs() < 1e-12);
        assert!((StatsCalculator::percentile(&sorted, 25.0) - 15.0).abs() < 1e-12);
        assert!((StatsCalculator::percentile(&sorted, 100.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_values_by_group_skips_nulls() {
        let df = df!(
            "Categoría" => &[Some("A"), Some("A"), Some("B"), None],
            "Valor" => &[Some(1.0), None, Some(3.0), Some(4.0)],
        )
        .unwrap();
        let groups = StatsCalculator::values_by_group(&df, "Categoría", "Valor").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("A".to_string(), vec![1.0]));
        assert_eq!(groups[1], ("B".to_string(), vec![3.0]));
    }

    #[test]
    fn test_group_summaries_mean_per_group() {
        let df = df!(
            "Departamento" => &["A", "A", "B"],
            "Valor" => &[10.0, 20.0, 5.0],
        )
        .unwrap();
        let summaries = StatsCalculator::group_summaries(&df, "Departamento", "Valor").unwrap();
        let a = summaries.iter().find(|(n, _)| n == "A").unwrap();
        assert!((a.1.mean - 15.0).abs() < 1e-12);
        assert_eq!(a.1.count, 2);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0];
        let hist = StatsCalculator::histogram(&values, 4);
        assert_eq!(hist.bars.len(), 4);
        let total: f64 = hist.bars.iter().map(|(_, c)| c).sum();
        assert_eq!(total, values.len() as f64);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let hist = StatsCalculator::histogram(&[7.0, 7.0, 7.0], 10);
        assert_eq!(hist.bars, vec![(7.0, 3.0)]);
    }

    #[test]
    fn test_kde_curve_is_positive_and_finite() {
        let values = [1.0, 2.0, 2.5, 3.0, 5.0];
        let curve = StatsCalculator::kde_curve(&values, 50);
        assert_eq!(curve.len(), 50);
        assert!(curve.iter().all(|[_, d]| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn test_kde_curve_empty_for_constant_data() {
        assert!(StatsCalculator::kde_curve(&[3.0, 3.0, 3.0], 50).is_empty());
    }

    #[test]
    fn test_correlation_of_linear_columns() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "b" => &[2.0, 4.0, 6.0, 8.0],
            "c" => &[4.0, 3.0, 2.0, 1.0],
        )
        .unwrap();
        let corr = StatsCalculator::correlation_matrix(&df).unwrap().unwrap();
        assert_eq!(corr.labels, vec!["a", "b", "c"]);
        assert!((corr.values[0][1] - 1.0).abs() < 1e-12);
        assert!((corr.values[0][2] + 1.0).abs() < 1e-12);
        assert!((corr.values[2][2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_none_without_numeric_columns() {
        let df = df!("nombre" => &["a", "b"]).unwrap();
        assert!(StatsCalculator::correlation_matrix(&df)
            .unwrap()
            .is_none());
    }
}
