//! Loosely typed table construction from JSON values.
//!
//! Accepts the same three data shapes as [`TableData`]: a 2D array (one
//! segment), an array of 2D arrays (several segments) or an object mapping
//! labels to 2D arrays. Column types are inferred per column.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::label::{Label, LabelsInput};
use crate::table::{Table, TableData};

impl Table {
    /// Build a table from JSON data and optional JSON labels.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInputType`] if `data` is not an array or object,
    ///   or one of its segments is not an array
    /// - [`Error::EmptyData`] for empty input or a segment without elements
    /// - [`Error::InvalidShape`] for a segment that is not a rectangular
    ///   2D array of scalars
    ///
    /// Each check runs over all segments before the next one starts, so an
    /// empty segment is reported ahead of a misshapen one.
    /// - [`Error::InvalidHeader`] / [`Error::InvalidIndex`] for labels that
    ///   are not a scalar or a flat array of scalars
    /// - everything [`Table::try_new`] reports
    ///
    /// # Example
    ///
    /// ```
    /// use mosaic::Table;
    /// use serde_json::json;
    ///
    /// let table = Table::from_json(&json!({"a": [[1], [2]], "b": [[1.5, "x"], [2.5, "y"]]}), None, None)?;
    /// assert_eq!(table.shape(), (2, 3));
    /// assert_eq!(table.n_cols_per_segment(), &[1, 2]);
    /// # Ok::<(), mosaic::Error>(())
    /// ```
    pub fn from_json(data: &Value, header: Option<&Value>, index: Option<&Value>) -> Result<Self> {
        let (keys, values): (Option<Vec<Label>>, Vec<&Value>) = match data {
            Value::Object(map) => {
                if map.is_empty() {
                    return Err(Error::empty_data("object has no entries"));
                }
                let keys = map.keys().map(|key| Label::from(key.as_str())).collect();
                (Some(keys), map.values().collect())
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(Error::empty_data("array has no elements"));
                }
                if holds_segments(items) {
                    (None, items.iter().collect())
                } else {
                    (None, vec![data])
                }
            }
            other => {
                return Err(Error::invalid_input_type(
                    "array or object",
                    json_kind(other),
                ))
            }
        };

        // Type and emptiness of every segment are checked before any shape
        check_segment_values(&values)?;
        let batches = values
            .iter()
            .enumerate()
            .map(|(i, value)| segment_from_json(i, value))
            .collect::<Result<Vec<_>>>()?;
        let data = match keys {
            Some(keys) => TableData::Labeled(keys.into_iter().zip(batches).collect()),
            None => TableData::Segments(batches),
        };

        let header = labels_from_json(header).map_err(Error::invalid_header)?;
        let index = labels_from_json(index).map_err(Error::invalid_index)?;
        Self::try_new(data, header, index)
    }
}

/// An array holds segments when its first element is itself a 2D array.
fn holds_segments(items: &[Value]) -> bool {
    matches!(
        items.first(),
        Some(Value::Array(rows)) if matches!(rows.first(), Some(Value::Array(_)))
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn labels_from_json(value: Option<&Value>) -> std::result::Result<Option<LabelsInput>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Label::from_json(item).ok_or_else(|| {
                    format!("element {i} is a {}, labels must be scalars", json_kind(item))
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(|labels| Some(LabelsInput::Sequence(labels))),
        Some(other) => Label::from_json(other)
            .map(|label| Some(LabelsInput::Scalar(label)))
            .ok_or_else(|| format!("expected a scalar or an array, found {}", json_kind(other))),
    }
}

/// Reject segment values that are not arrays or hold no elements.
fn check_segment_values(values: &[&Value]) -> Result<()> {
    for value in values {
        if !value.is_array() {
            return Err(Error::invalid_input_type("2D array", json_kind(value)));
        }
    }
    for (segment, value) in values.iter().enumerate() {
        let empty = value.as_array().map_or(true, |rows| {
            rows.iter()
                .all(|row| row.as_array().is_some_and(|cells| cells.is_empty()))
        });
        if empty {
            return Err(Error::empty_data(format!("segment {segment} has no elements")));
        }
    }
    Ok(())
}

/// Convert one 2D JSON array into a record batch.
fn segment_from_json(segment: usize, value: &Value) -> Result<RecordBatch> {
    let Value::Array(rows) = value else {
        return Err(Error::invalid_input_type("2D array", json_kind(value)));
    };

    let mut cells: Vec<&Vec<Value>> = Vec::with_capacity(rows.len());
    for row in rows {
        match row {
            Value::Array(row) => cells.push(row),
            other => {
                return Err(Error::invalid_shape(
                    segment,
                    format!("found 1 dimension, row is a {}", json_kind(other)),
                ))
            }
        }
    }

    let n_cols = cells.first().map_or(0, |row| row.len());
    for (r, row) in cells.iter().enumerate() {
        if row.len() != n_cols {
            return Err(Error::invalid_shape(
                segment,
                format!("row {r} has {} columns, expected {n_cols}", row.len()),
            ));
        }
        if let Some(nested) = row
            .iter()
            .find(|cell| matches!(cell, Value::Array(_) | Value::Object(_)))
        {
            return Err(Error::invalid_shape(
                segment,
                format!("row {r} holds a nested {}, found more than 2 dimensions", json_kind(nested)),
            ));
        }
    }

    let mut fields = Vec::with_capacity(n_cols);
    let mut columns = Vec::with_capacity(n_cols);
    for c in 0..n_cols {
        let values: Vec<&Value> = cells.iter().map(|row| &row[c]).collect();
        let array = column_from_json(&values);
        fields.push(Field::new(format!("c{c}"), array.data_type().clone(), true));
        columns.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Infer the narrowest column type: Boolean, Int64, Float64, else Utf8.
fn column_from_json(values: &[&Value]) -> ArrayRef {
    match infer_type(values) {
        DataType::Boolean => Arc::new(BooleanArray::from(
            values.iter().map(|v| v.as_bool()).collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            values.iter().map(|v| v.as_i64()).collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            values.iter().map(|v| v.as_f64()).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
    }
}

fn infer_type(values: &[&Value]) -> DataType {
    let non_null: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return DataType::Utf8;
    }
    if non_null.iter().all(|v| v.is_boolean()) {
        DataType::Boolean
    } else if non_null.iter().all(|v| v.is_i64()) {
        DataType::Int64
    } else if non_null.iter().all(|v| v.is_number()) {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}
