//! Filter predicates over the normalized dataset.
//!
//! All active predicates are AND-combined. A predicate is inactive (always
//! true) when its source column is absent from the frame or its allow-list
//! is empty, so an empty selection means "no restriction".

use polars::prelude::*;
use std::collections::BTreeSet;

use crate::data::schema::{self, CATEGORIA, DEPARTAMENTO, VALOR};

/// User-selected filters: region and category allow-lists plus an
/// inclusive numeric range on the value column.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    /// Inclusive `(low, high)` bounds on the value column.
    pub value_range: Option<(f64, f64)>,
}

impl FilterSpec {
    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.categories.is_empty() && self.value_range.is_none()
    }

    /// Records matching all active predicates, as a new frame.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        if self.is_empty() {
            return Ok(df.clone());
        }

        let mut mask = vec![true; df.height()];

        if !self.regions.is_empty() && schema::has_column(df, DEPARTAMENTO) {
            retain_allowed(df, DEPARTAMENTO, &self.regions, &mut mask)?;
        }
        if !self.categories.is_empty() && schema::has_column(df, CATEGORIA) {
            retain_allowed(df, CATEGORIA, &self.categories, &mut mask)?;
        }
        if let Some((low, high)) = self.value_range {
            if schema::has_column(df, VALOR) {
                let valor = df.column(VALOR)?.cast(&DataType::Float64)?;
                let ca = valor.f64()?;
                for (i, keep) in mask.iter_mut().enumerate() {
                    *keep &= matches!(ca.get(i), Some(v) if v >= low && v <= high);
                }
            }
        }

        df.filter(&BooleanChunked::from_slice("mask".into(), &mask))
    }
}

/// AND an allow-list predicate into `mask`. Null cells never match.
fn retain_allowed(
    df: &DataFrame,
    column: &str,
    allowed: &BTreeSet<String>,
    mask: &mut [bool],
) -> PolarsResult<()> {
    let values = text_values(df, column)?;
    for (keep, value) in mask.iter_mut().zip(values) {
        *keep &= matches!(value, Some(v) if allowed.contains(&v));
    }
    Ok(())
}

/// Per-row text rendering of a column; `None` for null cells.
pub(crate) fn text_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df.column(column)?.as_materialized_series().clone();
    Ok((0..series.len())
        .map(|i| {
            series.get(i).ok().and_then(|val| {
                if val.is_null() {
                    None
                } else {
                    Some(val.to_string().trim_matches('"').to_string())
                }
            })
        })
        .collect())
}

/// Min/max of the value column, the derived bounds of the range filter.
///
/// Recomputed whenever the dataset changes; `None` when the column is
/// absent or holds no numeric values.
pub fn value_bounds(df: &DataFrame) -> Option<(f64, f64)> {
    if !schema::has_column(df, VALOR) {
        return None;
    }
    let valor = df.column(VALOR).ok()?.cast(&DataType::Float64).ok()?;
    let ca = valor.f64().ok()?;
    match (ca.min(), ca.max()) {
        (Some(min), Some(max)) => Some((min, max)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> DataFrame {
        df!(
            DEPARTAMENTO => &["Antioquia", "Antioquia", "Cundinamarca", "Valle"],
            CATEGORIA => &["Comercio", "Industria", "Comercio", "Servicios"],
            VALOR => &[3.0, 10.0, 20.0, 7.5],
        )
        .unwrap()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let df = sample();
        let out = FilterSpec::default().apply(&df).unwrap();
        assert_eq!(out.height(), df.height());
    }

    #[test]
    fn test_empty_region_list_equals_no_region_filter() {
        let df = sample();
        let unrestricted = FilterSpec {
            categories: set(&["Comercio"]),
            ..Default::default()
        };
        // Same category filter, explicitly empty region allow-list.
        let with_empty_regions = FilterSpec {
            regions: BTreeSet::new(),
            categories: set(&["Comercio"]),
            ..Default::default()
        };
        let a = unrestricted.apply(&df).unwrap();
        let b = with_empty_regions.apply(&df).unwrap();
        assert_eq!(a.height(), 2);
        assert_eq!(a.height(), b.height());
    }

    #[test]
    fn test_region_allow_list() {
        let df = sample();
        let spec = FilterSpec {
            regions: set(&["Antioquia"]),
            ..Default::default()
        };
        assert_eq!(spec.apply(&df).unwrap().height(), 2);
    }

    #[test]
    fn test_value_range_is_inclusive() {
        let df = df!(
            DEPARTAMENTO => &["A", "B", "C"],
            VALOR => &[3.0, 10.0, 20.0],
        )
        .unwrap();
        let spec = FilterSpec {
            value_range: Some((5.0, 15.0)),
            ..Default::default()
        };
        let out = spec.apply(&df).unwrap();
        assert_eq!(out.height(), 1);
        let valor = out.column(VALOR).unwrap().f64().unwrap();
        assert_eq!(valor.get(0), Some(10.0));

        // Bounds themselves survive.
        let spec = FilterSpec {
            value_range: Some((3.0, 20.0)),
            ..Default::default()
        };
        assert_eq!(spec.apply(&df).unwrap().height(), 3);
    }

    #[test]
    fn test_predicate_on_missing_column_is_inactive() {
        let df = df!(DEPARTAMENTO => &["A", "B"]).unwrap();
        let spec = FilterSpec {
            categories: set(&["Comercio"]),
            value_range: Some((0.0, 1.0)),
            ..Default::default()
        };
        assert_eq!(spec.apply(&df).unwrap().height(), 2);
    }

    #[test]
    fn test_combined_filters() {
        let df = sample();
        let spec = FilterSpec {
            regions: set(&["Antioquia", "Cundinamarca"]),
            categories: set(&["Comercio"]),
            value_range: Some((5.0, 25.0)),
            ..Default::default()
        };
        let out = spec.apply(&df).unwrap();
        assert_eq!(out.height(), 1);
        let dep = text_values(&out, DEPARTAMENTO).unwrap();
        assert_eq!(dep[0].as_deref(), Some("Cundinamarca"));
    }

    #[test]
    fn test_null_cells_fail_active_predicates() {
        let df = df!(
            DEPARTAMENTO => &[Some("A"), None, Some("B")],
            VALOR => &[Some(1.0), Some(2.0), None],
        )
        .unwrap();
        let spec = FilterSpec {
            regions: set(&["A", "B"]),
            value_range: Some((0.0, 10.0)),
            ..Default::default()
        };
        // Row 1 has a null region, row 2 a null value.
        assert_eq!(spec.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn test_value_bounds_derived_from_data() {
        assert_eq!(value_bounds(&sample()), Some((3.0, 20.0)));
        let no_valor = df!(DEPARTAMENTO => &["A"]).unwrap();
        assert_eq!(value_bounds(&no_valor), None);
    }
}
