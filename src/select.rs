//! Positional selection of rows and columns.
//!
//! An [`IndexExpr`] holds one selector (rows only) or two (rows, then
//! columns). Each [`Selector`] resolves against its axis to a list of
//! positions; rows are then taken from every segment and columns are
//! projected from their owning segments.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use arrow::array::{Array, ArrowPrimitiveType, AsArray, RecordBatch, UInt64Array};
use arrow::compute::take_record_batch;
use arrow::datatypes::{
    ArrowNativeType, DataType, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};

use crate::error::{Axis, Error, Result};
use crate::mapper::ColumnIndexMapper;
use crate::table::Table;

/// A Python-style slice: optional start, stop and step.
///
/// Negative bounds count from the end, out-of-range bounds are clamped and
/// a negative step walks backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSpec {
    /// First position, inclusive
    pub start: Option<isize>,
    /// Last position, exclusive
    pub stop: Option<isize>,
    /// Stride, defaults to 1
    pub step: Option<isize>,
}

impl SliceSpec {
    /// The slice covering the whole axis.
    pub fn full() -> Self {
        Self::default()
    }

    /// A slice from `start` to `stop` with unit step.
    pub fn new(start: Option<isize>, stop: Option<isize>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    /// Set the stride.
    #[must_use]
    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Positions selected on an axis of length `len`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedIndexType`] for a zero step.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(Error::unsupported_index("a slice with step 0"));
        }
        let len = isize::try_from(len).unwrap_or(isize::MAX);

        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = self
            .start
            .map_or(if step > 0 { lower } else { upper }, clamp);
        let stop = self.stop.map_or(if step > 0 { upper } else { lower }, clamp);

        let mut positions = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            // Clamping keeps `i` inside 0..len here
            positions.push(i.unsigned_abs());
            // A step past either end of the range finishes the slice
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(positions)
    }
}

/// One component of an index expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single, possibly negative, position; keeps the axis
    Position(isize),
    /// A slice of positions
    Slice(SliceSpec),
    /// An ordered list of possibly negative positions
    Positions(Vec<isize>),
    /// A boolean mask as long as the axis
    Mask(Vec<bool>),
}

impl Selector {
    /// Build a selector from an Arrow array.
    ///
    /// Integer arrays become [`Selector::Positions`] and boolean arrays
    /// become [`Selector::Mask`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedIndexType`] for any other data type or
    /// an array containing nulls.
    pub fn try_from_array(array: &dyn Array) -> Result<Self> {
        if array.null_count() > 0 {
            return Err(Error::unsupported_index(format!(
                "an array with {} nulls",
                array.null_count()
            )));
        }

        let positions = match array.data_type() {
            DataType::Boolean => {
                return Ok(Self::Mask(array.as_boolean().iter().flatten().collect()));
            }
            DataType::Int8 => positions_from::<Int8Type>(array),
            DataType::Int16 => positions_from::<Int16Type>(array),
            DataType::Int32 => positions_from::<Int32Type>(array),
            DataType::Int64 => positions_from::<Int64Type>(array),
            DataType::UInt8 => positions_from::<UInt8Type>(array),
            DataType::UInt16 => positions_from::<UInt16Type>(array),
            DataType::UInt32 => positions_from::<UInt32Type>(array),
            DataType::UInt64 => positions_from::<UInt64Type>(array),
            other => {
                return Err(Error::unsupported_index(format!("an array of type {other}")));
            }
        };
        Ok(Self::Positions(positions))
    }

    /// Resolve to concrete positions on an axis of length `len`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfBounds`] for a position outside `[-len, len)`
    /// - [`Error::IndexLengthExceedsAxis`] for a position list longer
    ///   than the axis
    /// - [`Error::BooleanMaskLengthMismatch`] for a mask of the wrong length
    /// - [`Error::EmptySelection`] if nothing is selected
    pub fn resolve(&self, len: usize, axis: Axis) -> Result<Vec<usize>> {
        let positions = match self {
            Self::Position(index) => vec![normalize_position(*index, len, axis)?],
            Self::Slice(slice) => slice.indices(len)?,
            Self::Positions(indices) => {
                if indices.len() > len {
                    return Err(Error::IndexLengthExceedsAxis {
                        axis,
                        len: indices.len(),
                        axis_len: len,
                    });
                }
                indices
                    .iter()
                    .map(|&index| normalize_position(index, len, axis))
                    .collect::<Result<Vec<_>>>()?
            }
            Self::Mask(mask) => {
                if mask.len() != len {
                    return Err(Error::BooleanMaskLengthMismatch {
                        axis,
                        len: mask.len(),
                        expected: len,
                    });
                }
                mask.iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect()
            }
        };

        if positions.is_empty() {
            return Err(Error::EmptySelection { axis });
        }
        Ok(positions)
    }
}

fn positions_from<T: ArrowPrimitiveType>(array: &dyn Array) -> Vec<isize> {
    // Values beyond isize can never be in bounds
    array
        .as_primitive::<T>()
        .values()
        .iter()
        .map(|v| v.to_isize().unwrap_or(isize::MAX))
        .collect()
}

impl From<isize> for Selector {
    fn from(index: isize) -> Self {
        Self::Position(index)
    }
}

impl From<SliceSpec> for Selector {
    fn from(slice: SliceSpec) -> Self {
        Self::Slice(slice)
    }
}

impl From<Range<isize>> for Selector {
    fn from(range: Range<isize>) -> Self {
        Self::Slice(SliceSpec::new(Some(range.start), Some(range.end)))
    }
}

impl From<RangeFrom<isize>> for Selector {
    fn from(range: RangeFrom<isize>) -> Self {
        Self::Slice(SliceSpec::new(Some(range.start), None))
    }
}

impl From<RangeTo<isize>> for Selector {
    fn from(range: RangeTo<isize>) -> Self {
        Self::Slice(SliceSpec::new(None, Some(range.end)))
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Self::Slice(SliceSpec::full())
    }
}

impl From<Vec<isize>> for Selector {
    fn from(indices: Vec<isize>) -> Self {
        Self::Positions(indices)
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Self::Mask(mask)
    }
}

/// A positional index expression: rows, optionally followed by columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    rows: Selector,
    cols: Option<Selector>,
}

impl IndexExpr {
    /// Build an expression from its components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyIndexDimensions`] unless there are one or
    /// two components.
    pub fn new(components: Vec<Selector>) -> Result<Self> {
        let n_dim = components.len();
        let mut components = components.into_iter();
        match (components.next(), components.next(), components.next()) {
            (Some(rows), cols, None) => Ok(Self { rows, cols }),
            _ => Err(Error::TooManyIndexDimensions { n_dim }),
        }
    }

    /// Select rows only.
    pub fn rows(rows: impl Into<Selector>) -> Self {
        Self {
            rows: rows.into(),
            cols: None,
        }
    }

    /// Select rows, then columns.
    pub fn cells(rows: impl Into<Selector>, cols: impl Into<Selector>) -> Self {
        Self {
            rows: rows.into(),
            cols: Some(cols.into()),
        }
    }

    /// Number of components, 1 or 2.
    pub fn n_dim(&self) -> usize {
        1 + usize::from(self.cols.is_some())
    }
}

impl From<Selector> for IndexExpr {
    fn from(rows: Selector) -> Self {
        Self { rows, cols: None }
    }
}

impl From<(Selector, Selector)> for IndexExpr {
    fn from((rows, cols): (Selector, Selector)) -> Self {
        Self {
            rows,
            cols: Some(cols),
        }
    }
}

/// Map a possibly negative position onto `0..len`.
pub(crate) fn normalize_position(index: isize, len: usize, axis: Axis) -> Result<usize> {
    let out_of_bounds = || Error::IndexOutOfBounds { axis, index, len };
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    };
    match resolved {
        Some(pos) if pos < len => Ok(pos),
        _ => Err(out_of_bounds()),
    }
}

impl Table {
    /// Select rows, or rows and columns, by position.
    ///
    /// The result is a new table; `self` is never modified. A single
    /// selector keeps every column and the full segment layout. With a
    /// column selector, consecutive selected columns from the same segment
    /// stay together in one output segment.
    ///
    /// # Errors
    ///
    /// See [`Selector::resolve`]; arrow errors from taking rows are passed
    /// through as [`Error::Arrow`].
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use arrow::array::{Int32Array, RecordBatch};
    /// use arrow::datatypes::{DataType, Field, Schema};
    /// use mosaic::{IndexExpr, Table};
    ///
    /// let schema = Arc::new(Schema::new(vec![
    ///     Field::new("a", DataType::Int32, false),
    ///     Field::new("b", DataType::Int32, false),
    /// ]));
    /// let batch = RecordBatch::try_new(
    ///     schema,
    ///     vec![
    ///         Arc::new(Int32Array::from(vec![1, 2, 3])),
    ///         Arc::new(Int32Array::from(vec![4, 5, 6])),
    ///     ],
    /// )?;
    /// let table = Table::from_batch(batch)?;
    /// let picked = table.select(IndexExpr::cells(1isize..3, -1isize))?;
    /// assert_eq!(picked.shape(), (2, 1));
    /// assert_eq!(picked.cell(0, 0)?, "5");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn select(&self, idx: impl Into<IndexExpr>) -> Result<Self> {
        let idx = idx.into();
        let rows = idx.rows.resolve(self.n_rows, Axis::Rows)?;
        let cols = match &idx.cols {
            Some(sel) => Some(sel.resolve(self.n_cols(), Axis::Columns)?),
            None => None,
        };

        let row_identity = is_identity(&rows, self.n_rows);
        let mut segments = if row_identity {
            self.segments.clone()
        } else {
            let indices = UInt64Array::from_iter_values(rows.iter().map(|&r| r as u64));
            self.segments
                .iter()
                .map(|batch| take_record_batch(batch, &indices))
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let index = self
            .index
            .as_ref()
            .map(|labels| rows.iter().map(|&r| labels[r].clone()).collect());

        let (mapper, header) = match cols {
            Some(cols) if !is_identity(&cols, self.n_cols()) => {
                let (projected, mapper) = project_columns(&segments, &self.mapper, &cols)?;
                segments = projected;
                let header = self
                    .header
                    .as_ref()
                    .map(|labels| cols.iter().map(|&c| labels[c].clone()).collect());
                (mapper, header)
            }
            _ => (self.mapper.clone(), self.header.clone()),
        };

        tracing::debug!(
            n_dim = idx.n_dim(),
            n_rows = rows.len(),
            n_cols = mapper.n_cols(),
            n_arrs = segments.len(),
            "selected from table"
        );

        Self::from_parts(segments, mapper, rows.len(), header, index)
    }
}

fn is_identity(positions: &[usize], len: usize) -> bool {
    positions.len() == len && positions.iter().enumerate().all(|(i, &p)| i == p)
}

/// Project global columns out of their segments, grouping consecutive
/// columns that share a segment.
fn project_columns(
    segments: &[RecordBatch],
    mapper: &ColumnIndexMapper,
    cols: &[usize],
) -> Result<(Vec<RecordBatch>, ColumnIndexMapper)> {
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for &col in cols {
        let loc = mapper.locate(col)?;
        match groups.last_mut() {
            Some((segment, locals)) if *segment == loc.segment => locals.push(loc.local),
            _ => groups.push((loc.segment, vec![loc.local])),
        }
    }

    let mut projected = Vec::with_capacity(groups.len());
    let mut n_cols_per_segment = Vec::with_capacity(groups.len());
    for (segment, locals) in groups {
        projected.push(segments[segment].project(&locals)?);
        n_cols_per_segment.push(locals.len());
    }
    Ok((projected, ColumnIndexMapper::new(n_cols_per_segment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{Label, LabelsInput};
    use crate::table::test_util::grid;
    use arrow::array::{BooleanArray, Int32Array, StringArray, UInt8Array};

    fn two_segment_table() -> Table {
        Table::try_new(
            vec![grid(5, 2, 0), grid(5, 3, 100)],
            Some(LabelsInput::from(vec!["a", "b", "c", "d", "e"])),
            Some(LabelsInput::from(vec![10, 11, 12, 13, 14])),
        )
        .unwrap()
    }

    #[test]
    fn test_slice_indices_python_semantics() {
        assert_eq!(SliceSpec::full().indices(4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(
            SliceSpec::new(Some(1), Some(3)).indices(5).unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            SliceSpec::new(Some(-2), None).indices(5).unwrap(),
            vec![3, 4]
        );
        assert_eq!(
            SliceSpec::new(None, Some(100)).indices(3).unwrap(),
            vec![0, 1, 2]
        );
        assert_eq!(
            SliceSpec::full().with_step(-1).indices(3).unwrap(),
            vec![2, 1, 0]
        );
        assert_eq!(
            SliceSpec::full().with_step(2).indices(5).unwrap(),
            vec![0, 2, 4]
        );
        assert_eq!(
            SliceSpec::new(Some(-1), Some(-10)).with_step(-2).indices(5).unwrap(),
            vec![4, 2, 0]
        );
        assert!(SliceSpec::new(Some(3), Some(1)).indices(5).unwrap().is_empty());
    }

    #[test]
    fn test_slice_zero_step() {
        assert!(matches!(
            SliceSpec::full().with_step(0).indices(3),
            Err(Error::UnsupportedIndexType { .. })
        ));
    }

    #[test]
    fn test_slice_step_past_axis_end() {
        assert_eq!(
            SliceSpec::new(Some(1), None)
                .with_step(isize::MAX)
                .indices(5)
                .unwrap(),
            vec![1]
        );
        assert_eq!(
            SliceSpec::full().with_step(isize::MIN).indices(5).unwrap(),
            vec![4]
        );
        assert_eq!(
            SliceSpec::new(Some(-1), None)
                .with_step(-isize::MAX)
                .indices(5)
                .unwrap(),
            vec![4]
        );
    }

    #[test]
    fn test_select_with_huge_step() {
        let table = two_segment_table();
        let slice = SliceSpec::new(Some(1), None).with_step(isize::MAX);
        let rows = table.select(IndexExpr::rows(Selector::Slice(slice))).unwrap();
        assert_eq!(rows.n_rows(), 1);
        assert_eq!(rows.index().unwrap(), &[Label::Int(11)]);
        assert_eq!(rows.cell(0, 0).unwrap(), "10");
    }

    #[test]
    fn test_normalize_position() {
        assert_eq!(normalize_position(0, 3, Axis::Rows).unwrap(), 0);
        assert_eq!(normalize_position(-1, 3, Axis::Rows).unwrap(), 2);
        assert_eq!(normalize_position(-3, 3, Axis::Rows).unwrap(), 0);
        assert!(normalize_position(3, 3, Axis::Rows).is_err());
        assert!(normalize_position(-4, 3, Axis::Rows).is_err());
    }

    #[test]
    fn test_index_expr_dimensions() {
        assert!(IndexExpr::new(vec![Selector::Position(0)]).is_ok());
        assert_eq!(
            IndexExpr::new(vec![Selector::Position(0), Selector::Position(1)])
                .unwrap()
                .n_dim(),
            2
        );
        assert!(matches!(
            IndexExpr::new(vec![
                Selector::Position(0),
                Selector::Position(0),
                Selector::Position(0)
            ]),
            Err(Error::TooManyIndexDimensions { n_dim: 3 })
        ));
        assert!(matches!(
            IndexExpr::new(Vec::new()),
            Err(Error::TooManyIndexDimensions { n_dim: 0 })
        ));
    }

    #[test]
    fn test_selector_from_arrays() {
        let ints = Int32Array::from(vec![0, -1]);
        assert_eq!(
            Selector::try_from_array(&ints).unwrap(),
            Selector::Positions(vec![0, -1])
        );
        let bytes = UInt8Array::from(vec![2]);
        assert_eq!(
            Selector::try_from_array(&bytes).unwrap(),
            Selector::Positions(vec![2])
        );
        let mask = BooleanArray::from(vec![true, false]);
        assert_eq!(
            Selector::try_from_array(&mask).unwrap(),
            Selector::Mask(vec![true, false])
        );
    }

    #[test]
    fn test_selector_from_unsupported_array() {
        let strings = StringArray::from(vec!["a"]);
        assert!(matches!(
            Selector::try_from_array(&strings),
            Err(Error::UnsupportedIndexType { .. })
        ));
        let with_null = Int32Array::from(vec![Some(1), None]);
        assert!(matches!(
            Selector::try_from_array(&with_null),
            Err(Error::UnsupportedIndexType { .. })
        ));
    }

    #[test]
    fn test_single_row_keeps_structure() {
        let table = two_segment_table();
        let row = table.select(Selector::Position(2)).unwrap();
        assert_eq!(row.n_rows(), 1);
        assert_eq!(row.n_cols_per_segment(), table.n_cols_per_segment());
        assert_eq!(row.header(), table.header());
        assert_eq!(row.index().unwrap(), &[Label::Int(12)]);
        assert_eq!(row.cell(0, 3).unwrap(), "121");
    }

    #[test]
    fn test_negative_row_positions() {
        let table = two_segment_table();
        let rows = table.select(Selector::Positions(vec![-1, 0])).unwrap();
        assert_eq!(rows.column_text(0).unwrap(), vec!["40", "0"]);
        assert_eq!(rows.index().unwrap(), &[Label::Int(14), Label::Int(10)]);
    }

    #[test]
    fn test_row_mask() {
        let table = two_segment_table();
        let rows = table
            .select(Selector::Mask(vec![true, false, true, false, false]))
            .unwrap();
        assert_eq!(rows.n_rows(), 2);
        assert_eq!(rows.column_text(-1).unwrap(), vec!["102", "122"]);
    }

    #[test]
    fn test_columns_within_one_segment() {
        let table = two_segment_table();
        let picked = table
            .select(IndexExpr::cells(.., Selector::Positions(vec![3, 4])))
            .unwrap();
        assert_eq!(picked.n_arrs(), 1);
        assert_eq!(picked.n_cols_per_segment(), &[2]);
        let header: Vec<String> = picked.header().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(header, vec!["d", "e"]);
    }

    #[test]
    fn test_columns_spanning_segments() {
        let table = two_segment_table();
        let picked = table.select(IndexExpr::cells(0isize..2, 1isize..4)).unwrap();
        assert_eq!(picked.shape(), (2, 3));
        assert_eq!(picked.n_cols_per_segment(), &[1, 2]);
        assert_eq!(picked.cell(1, 0).unwrap(), "11");
        assert_eq!(picked.cell(1, 1).unwrap(), "110");
        assert_eq!(picked.index().unwrap(), &[Label::Int(10), Label::Int(11)]);
    }

    #[test]
    fn test_reordered_columns_regroup() {
        let table = two_segment_table();
        let picked = table
            .select(IndexExpr::cells(.., Selector::Positions(vec![4, 0, 1, 2])))
            .unwrap();
        assert_eq!(picked.n_cols_per_segment(), &[1, 2, 1]);
        assert_eq!(picked.header_num(), 0..4);
        assert_eq!(picked.cell(0, 0).unwrap(), "102");
    }

    #[test]
    fn test_full_selection_round_trip() {
        let table = two_segment_table();
        let copy = table.select(IndexExpr::cells(.., ..)).unwrap();
        assert_eq!(copy, table);
    }

    #[test]
    fn test_out_of_range_position() {
        let table = two_segment_table();
        assert!(matches!(
            table.select(Selector::Position(5)),
            Err(Error::IndexOutOfBounds {
                axis: Axis::Rows,
                index: 5,
                len: 5
            })
        ));
        assert!(matches!(
            table.select(IndexExpr::cells(.., Selector::Position(-6))),
            Err(Error::IndexOutOfBounds {
                axis: Axis::Columns,
                ..
            })
        ));
    }

    #[test]
    fn test_mask_length_mismatch() {
        let table = two_segment_table();
        assert!(matches!(
            table.select(Selector::Mask(vec![true; 4])),
            Err(Error::BooleanMaskLengthMismatch {
                axis: Axis::Rows,
                len: 4,
                expected: 5
            })
        ));
    }

    #[test]
    fn test_position_list_too_long() {
        let table = two_segment_table();
        assert!(matches!(
            table.select(Selector::Positions(vec![0; 6])),
            Err(Error::IndexLengthExceedsAxis { len: 6, axis_len: 5, .. })
        ));
    }

    #[test]
    fn test_empty_selection() {
        let table = two_segment_table();
        assert!(matches!(
            table.select(Selector::Mask(vec![false; 5])),
            Err(Error::EmptySelection { axis: Axis::Rows })
        ));
    }

    #[test]
    fn test_source_unchanged_after_error() {
        let table = two_segment_table();
        let before = table.clone();
        assert!(table.select(Selector::Position(99)).is_err());
        assert_eq!(table, before);
        assert!(table.select(Selector::Position(0)).is_ok());
    }
}
