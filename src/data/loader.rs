//! CSV Data Loader
//! Reads the source file into a Polars DataFrame and normalizes it.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::schema;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Load a CSV file and normalize it to the canonical schema.
///
/// Headers are renamed through the alias rule table and the coordinate
/// columns are coerced to `Float64`, with unparsable cells becoming null
/// instead of failing the load. A missing path or a malformed file (e.g. a
/// row wider than the header) is a [`LoadError`]; the caller surfaces it
/// rather than rendering anything for the dataset.
///
/// Loading the same path twice yields structurally identical frames.
pub fn load_dataset(path: &Path) -> Result<DataFrame, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }

    let mut df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10_000))
        .finish()?
        .collect()?;

    normalize(&mut df)?;
    log::info!(
        "loaded {}: {} rows, {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Rename aliased headers and coerce coordinates in place.
fn normalize(df: &mut DataFrame) -> PolarsResult<()> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (old, canonical) in schema::rename_plan(&headers) {
        df.rename(&old, canonical.into())?;
    }

    for coord in [schema::LATITUD, schema::LONGITUD] {
        if schema::has_column(df, coord) {
            // Non-strict cast: values that fail to parse become null.
            let cast = df.column(coord)?.cast(&DataType::Float64)?;
            df.with_column(cast)?;
        }
    }

    Ok(())
}

/// Column names of a loaded frame.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Names of numeric (integer or float) columns.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
            )
        })
        .map(|col| col.name().to_string())
        .collect()
}

/// Sorted non-null unique values of a column, rendered as text.
/// Returns an empty list when the column is absent.
pub fn unique_values(df: &DataFrame, column: &str) -> Vec<String> {
    let mut values: Vec<String> = df
        .column(column)
        .ok()
        .and_then(|col| col.unique().ok())
        .map(|unique| {
            let series = unique.as_materialized_series();
            (0..series.len())
                .filter_map(|i| {
                    let val = series.get(i).ok()?;
                    if val.is_null() {
                        None
                    } else {
                        Some(val.to_string().trim_matches('"').to_string())
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    values.sort();
    values
}
