//! Per-region aggregation feeding the map and the summary table.

use polars::prelude::*;
use std::collections::HashMap;

use crate::data::filter::{text_values, FilterSpec};
use crate::data::schema::{self, DEPARTAMENTO, LATITUD, LONGITUD, VALOR};

/// Fallback map center (roughly Bogotá) when no aggregate rows exist.
pub const DEFAULT_CENTER: [f64; 2] = [4.6, -74.1];

/// One aggregate row per region surviving the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub departamento: String,
    /// Mean latitude of the region's records.
    pub lat: f64,
    /// Mean longitude of the region's records.
    pub lon: f64,
    /// Number of records with coordinates.
    pub conteo: usize,
    /// Mean value; NaN when the group holds no values.
    pub valor_prom: f64,
}

#[derive(Default)]
struct Accumulator {
    lat_sum: f64,
    lon_sum: f64,
    count: usize,
    valor_sum: f64,
    valor_count: usize,
}

/// Group the filtered dataset by region and compute per-region means.
///
/// Records failing any active filter predicate, records without
/// coordinates, and records with a null region are dropped before
/// grouping. Null values are excluded from the value mean rather than
/// counted as zero. The result is unordered; display ordering belongs to
/// the presentation layer.
///
/// When the region or coordinate columns are missing entirely the result
/// is an empty sequence, not an error.
pub fn aggregate(df: &DataFrame, filters: &FilterSpec) -> PolarsResult<Vec<RegionSummary>> {
    for required in [DEPARTAMENTO, LATITUD, LONGITUD] {
        if !schema::has_column(df, required) {
            log::warn!("aggregation skipped: column '{required}' is missing");
            return Ok(Vec::new());
        }
    }

    let dff = filters.apply(df)?;

    let regions = text_values(&dff, DEPARTAMENTO)?;
    let lat_col = dff.column(LATITUD)?.cast(&DataType::Float64)?;
    let lat = lat_col.f64()?;
    let lon_col = dff.column(LONGITUD)?.cast(&DataType::Float64)?;
    let lon = lon_col.f64()?;

    let valor_col = if schema::has_column(&dff, VALOR) {
        Some(dff.column(VALOR)?.cast(&DataType::Float64)?)
    } else {
        None
    };
    let valor = match &valor_col {
        Some(col) => Some(col.f64()?),
        None => None,
    };

    let mut groups: HashMap<String, Accumulator> = HashMap::new();

    for i in 0..dff.height() {
        let (Some(region), Some(lat), Some(lon)) = (regions[i].clone(), lat.get(i), lon.get(i))
        else {
            continue;
        };

        let acc = groups.entry(region).or_default();
        acc.lat_sum += lat;
        acc.lon_sum += lon;
        acc.count += 1;
        if let Some(v) = valor.and_then(|ca| ca.get(i)) {
            if !v.is_nan() {
                acc.valor_sum += v;
                acc.valor_count += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(departamento, acc)| RegionSummary {
            departamento,
            lat: acc.lat_sum / acc.count as f64,
            lon: acc.lon_sum / acc.count as f64,
            conteo: acc.count,
            valor_prom: if acc.valor_count > 0 {
                acc.valor_sum / acc.valor_count as f64
            } else {
                f64::NAN
            },
        })
        .collect())
}

/// Mean point of the aggregate rows, or [`DEFAULT_CENTER`] when empty.
pub fn map_center(rows: &[RegionSummary]) -> [f64; 2] {
    if rows.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = rows.len() as f64;
    [
        rows.iter().map(|r| r.lat).sum::<f64>() / n,
        rows.iter().map(|r| r.lon).sum::<f64>() / n,
    ]
}

/// Rows sorted by mean value, descending, NaN last (display order).
pub fn sorted_by_value(rows: &[RegionSummary]) -> Vec<RegionSummary> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        match (a.valor_prom.is_nan(), b.valor_prom.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => b
                .valor_prom
                .partial_cmp(&a.valor_prom)
                .unwrap_or(std::cmp::Ordering::Equal),
        }
    });
    sorted
}

/// Build an exportable frame from summary rows, in display order.
pub fn summary_frame(rows: &[RegionSummary]) -> PolarsResult<DataFrame> {
    let sorted = sorted_by_value(rows);
    DataFrame::new(vec![
        Column::new(
            DEPARTAMENTO.into(),
            sorted
                .iter()
                .map(|r| r.departamento.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new("Lat".into(), sorted.iter().map(|r| r.lat).collect::<Vec<_>>()),
        Column::new("Lon".into(), sorted.iter().map(|r| r.lon).collect::<Vec<_>>()),
        Column::new(
            "Conteo".into(),
            sorted.iter().map(|r| r.conteo as u32).collect::<Vec<_>>(),
        ),
        Column::new(
            "Valor_prom".into(),
            sorted.iter().map(|r| r.valor_prom).collect::<Vec<_>>(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::collections::BTreeSet;

    fn sample() -> DataFrame {
        df!(
            DEPARTAMENTO => &["Antioquia", "Antioquia", "Cundinamarca", "Valle"],
            LATITUD => &[Some(6.2), Some(6.4), Some(4.6), None],
            LONGITUD => &[Some(-75.5), Some(-75.3), Some(-74.1), Some(-76.5)],
            "Categoría" => &["Comercio", "Industria", "Comercio", "Comercio"],
            VALOR => &[10.0, 20.0, 8.0, 99.0],
        )
        .unwrap()
    }

    fn by_region(rows: Vec<RegionSummary>) -> HashMap<String, RegionSummary> {
        rows.into_iter()
            .map(|r| (r.departamento.clone(), r))
            .collect()
    }

    #[test]
    fn test_group_means_and_counts() {
        let rows = aggregate(&sample(), &FilterSpec::default()).unwrap();
        let rows = by_region(rows);

        let antioquia = &rows["Antioquia"];
        assert_eq!(antioquia.conteo, 2);
        assert!((antioquia.valor_prom - 15.0).abs() < 1e-12);
        assert!((antioquia.lat - 6.3).abs() < 1e-12);
        assert!((antioquia.lon - -75.4).abs() < 1e-12);
    }

    #[test]
    fn test_rows_without_coordinates_are_dropped() {
        // "Valle" only has a longitude, so it contributes no group.
        let rows = aggregate(&sample(), &FilterSpec::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.departamento != "Valle"));
    }

    #[test]
    fn test_counts_sum_to_filtered_rows_with_coordinates() {
        let spec = FilterSpec {
            categories: ["Comercio".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let rows = aggregate(&sample(), &spec).unwrap();
        // Comercio rows: Antioquia (coords), Cundinamarca (coords),
        // Valle (missing latitude).
        let total: usize = rows.iter().map(|r| r.conteo).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_missing_coordinate_columns_yield_empty() {
        let df = df!(
            DEPARTAMENTO => &["Antioquia"],
            VALOR => &[10.0],
        )
        .unwrap();
        assert!(aggregate(&df, &FilterSpec::default()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_region_column_yields_empty() {
        let df = df!(
            LATITUD => &[6.2],
            LONGITUD => &[-75.5],
        )
        .unwrap();
        assert!(aggregate(&df, &FilterSpec::default()).unwrap().is_empty());
    }

    #[test]
    fn test_null_region_rows_are_dropped() {
        let df = df!(
            DEPARTAMENTO => &[Some("Antioquia"), None],
            LATITUD => &[6.2, 4.6],
            LONGITUD => &[-75.5, -74.1],
        )
        .unwrap();
        let rows = aggregate(&df, &FilterSpec::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].conteo, 1);
    }

    #[test]
    fn test_missing_value_column_gives_nan_mean() {
        let df = df!(
            DEPARTAMENTO => &["Antioquia"],
            LATITUD => &[6.2],
            LONGITUD => &[-75.5],
        )
        .unwrap();
        let rows = aggregate(&df, &FilterSpec::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].valor_prom.is_nan());
    }

    #[test]
    fn test_null_values_excluded_from_mean_not_zero() {
        let df = df!(
            DEPARTAMENTO => &["Antioquia", "Antioquia", "Antioquia"],
            LATITUD => &[6.2, 6.2, 6.2],
            LONGITUD => &[-75.5, -75.5, -75.5],
            VALOR => &[Some(10.0), None, Some(20.0)],
        )
        .unwrap();
        let rows = aggregate(&df, &FilterSpec::default()).unwrap();
        assert_eq!(rows[0].conteo, 3);
        assert!((rows[0].valor_prom - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_region_allow_list_keeps_all_regions() {
        let spec = FilterSpec {
            regions: BTreeSet::new(),
            ..Default::default()
        };
        let with_empty = aggregate(&sample(), &spec).unwrap();
        let without = aggregate(&sample(), &FilterSpec::default()).unwrap();
        assert_eq!(with_empty.len(), without.len());
    }

    #[test]
    fn test_map_center_fallback() {
        assert_eq!(map_center(&[]), DEFAULT_CENTER);

        let rows = vec![
            RegionSummary {
                departamento: "A".into(),
                lat: 2.0,
                lon: -70.0,
                conteo: 1,
                valor_prom: 1.0,
            },
            RegionSummary {
                departamento: "B".into(),
                lat: 6.0,
                lon: -76.0,
                conteo: 1,
                valor_prom: 2.0,
            },
        ];
        assert_eq!(map_center(&rows), [4.0, -73.0]);
    }

    #[test]
    fn test_display_sort_descending_nan_last() {
        let rows = vec![
            RegionSummary {
                departamento: "low".into(),
                lat: 0.0,
                lon: 0.0,
                conteo: 1,
                valor_prom: 1.0,
            },
            RegionSummary {
                departamento: "none".into(),
                lat: 0.0,
                lon: 0.0,
                conteo: 1,
                valor_prom: f64::NAN,
            },
            RegionSummary {
                departamento: "high".into(),
                lat: 0.0,
                lon: 0.0,
                conteo: 1,
                valor_prom: 9.0,
            },
        ];
        let sorted = sorted_by_value(&rows);
        let names: Vec<_> = sorted.iter().map(|r| r.departamento.as_str()).collect();
        assert_eq!(names, vec!["high", "low", "none"]);
    }

    #[test]
    fn test_summary_frame_shape() {
        let rows = aggregate(&sample(), &FilterSpec::default()).unwrap();
        let frame = summary_frame(&rows).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 5);
    }
}
