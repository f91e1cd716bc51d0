//! DataFrame entry point.
//!
//! Turns a polars [`DataFrame`] into the `f64` feature matrix and label
//! vector the learner trains on. Every column must be numeric and null-free;
//! encoding and imputation are the caller's job.

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{AutoSplitError, Result};

/// Features and labels pulled out of a DataFrame.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
    /// Feature column names, in matrix column order.
    pub feature_names: Vec<String>,
}

/// Split `df` into features and a target column.
///
/// With `target == None` the last column is the target. The remaining
/// columns keep their frame order.
///
/// # Errors
///
/// - [`AutoSplitError::InvalidData`] if the frame has fewer than two columns,
///   or a column is non-numeric or contains nulls
/// - [`AutoSplitError::ColumnNotFound`] if `target` is not a column
pub fn split_target(df: &DataFrame, target: Option<&str>) -> Result<FrameData> {
    if df.width() < 2 {
        return Err(AutoSplitError::InvalidData(format!(
            "need at least one feature column and a target, got {} column(s)",
            df.width()
        )));
    }

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let target_name = match target {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => return Err(AutoSplitError::ColumnNotFound(name.to_string())),
        None => names
            .last()
            .cloned()
            .ok_or_else(|| AutoSplitError::InvalidData("frame has no columns".to_string()))?,
    };

    let feature_names: Vec<String> = names.into_iter().filter(|n| *n != target_name).collect();
    let features = feature_matrix(df, &feature_names)?;
    let target = Array1::from_vec(numeric_column(df, &target_name)?);

    Ok(FrameData {
        features,
        target,
        feature_names,
    })
}

/// Collect the named columns into a row-major `f64` matrix.
///
/// # Errors
///
/// - [`AutoSplitError::ColumnNotFound`] if a name is not in `df`
/// - [`AutoSplitError::InvalidData`] for non-numeric or null-containing columns
pub fn feature_matrix(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let columns = names
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((df.height(), columns.len()), |(row, col)| {
        columns[col][row]
    }))
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| AutoSplitError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series();

    if !is_numeric_dtype(series.dtype()) {
        return Err(AutoSplitError::InvalidData(format!(
            "column '{}' is not numeric ({})",
            name,
            series.dtype()
        )));
    }

    let nulls = series.null_count();
    if nulls > 0 {
        return Err(AutoSplitError::InvalidData(format!(
            "column '{name}' has {nulls} null value(s)"
        )));
    }

    let values = series.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_no_null_iter().collect())
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_df() -> DataFrame {
        df! {
            "age" => [25i64, 30, 35, 40],
            "income" => [50.0, 60.0, 70.0, 80.0],
            "churned" => [0i32, 1, 0, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_split_target_defaults_to_last_column() {
        let data = split_target(&sample_df(), None).unwrap();

        assert_eq!(data.feature_names, vec!["age", "income"]);
        assert_eq!(data.features.dim(), (4, 2));
        assert_eq!(data.features[[1, 0]], 30.0);
        assert_eq!(data.features[[3, 1]], 80.0);
        assert_eq!(data.target.to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_split_target_named_column() {
        let data = split_target(&sample_df(), Some("age")).unwrap();

        assert_eq!(data.feature_names, vec!["income", "churned"]);
        assert_eq!(data.target.to_vec(), vec![25.0, 30.0, 35.0, 40.0]);
    }

    #[test]
    fn test_split_target_missing_column() {
        let err = split_target(&sample_df(), Some("label")).unwrap_err();
        assert!(matches!(err, AutoSplitError::ColumnNotFound(name) if name == "label"));
    }

    #[test]
    fn test_split_target_needs_two_columns() {
        let df = df! { "only" => [1.0, 2.0] }.unwrap();
        let err = split_target(&df, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_rejects_nulls() {
        let df = df! {
            "a" => [Some(1.0), None, Some(3.0)],
            "y" => [0.0, 1.0, 0.0],
        }
        .unwrap();

        let err = split_target(&df, None).unwrap_err();
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_rejects_text_columns() {
        let df = df! {
            "city" => ["a", "b"],
            "y" => [0.0, 1.0],
        }
        .unwrap();

        let err = split_target(&df, None).unwrap_err();
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_feature_matrix_follows_requested_order() {
        let names = vec!["income".to_string(), "age".to_string()];
        let x = feature_matrix(&sample_df(), &names).unwrap();

        assert_eq!(x.row(0).to_vec(), vec![50.0, 25.0]);
    }
}
