//! The segmented [`Table`] type.
//!
//! A table unifies one or more Arrow record batches ("segments") that share
//! a row count into a single logical 2D table. Columns are numbered
//! contiguously across segments; [`ColumnIndexMapper`] translates between
//! global and per-segment column positions.

use std::ops::Range;

use arrow::array::{ArrayRef, RecordBatch};

use crate::error::{Axis, Error, Result};
use crate::format::format_array_value;
use crate::label::{Label, LabelsInput};
use crate::mapper::{ColumnIndexMapper, ColumnLocation};
use crate::select::normalize_position;

/// Input accepted by [`Table::try_new`].
///
/// Each variant normalizes to the same internal list of segments.
#[derive(Debug, Clone)]
pub enum TableData {
    /// A single segment
    Single(RecordBatch),
    /// An ordered list of segments sharing a row count
    Segments(Vec<RecordBatch>),
    /// An ordered mapping from label to segment; the header repeats each
    /// label once per column its segment contributes
    Labeled(Vec<(Label, RecordBatch)>),
}

impl From<RecordBatch> for TableData {
    fn from(batch: RecordBatch) -> Self {
        Self::Single(batch)
    }
}

impl From<Vec<RecordBatch>> for TableData {
    fn from(batches: Vec<RecordBatch>) -> Self {
        Self::Segments(batches)
    }
}

impl<L: Into<Label>> From<Vec<(L, RecordBatch)>> for TableData {
    fn from(pairs: Vec<(L, RecordBatch)>) -> Self {
        Self::Labeled(
            pairs
                .into_iter()
                .map(|(label, batch)| (label.into(), batch))
                .collect(),
        )
    }
}

/// A column-oriented table backed by one or more record batches.
///
/// Tables are immutable once built: selection returns a new table and the
/// source stays valid.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{Int32Array, RecordBatch};
/// use arrow::datatypes::{DataType, Field, Schema};
/// use mosaic::Table;
///
/// let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, false)]));
/// let batch = RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![1, 2, 3]))])?;
/// let table = Table::from_batch(batch)?;
/// assert_eq!(table.shape(), (3, 1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) segments: Vec<RecordBatch>,
    pub(crate) mapper: ColumnIndexMapper,
    pub(crate) n_rows: usize,
    pub(crate) header: Option<Vec<Label>>,
    pub(crate) index: Option<Vec<Label>>,
}

impl Table {
    /// Build a table from segments and optional labels.
    ///
    /// # Errors
    ///
    /// Validation runs in this order:
    /// - [`Error::EmptyData`] if there are no segments or a segment has no
    ///   elements
    /// - [`Error::RowCountMismatch`] if segments disagree on row count
    /// - [`Error::InvalidHeader`] if a header is combined with labeled
    ///   segments, [`Error::HeaderLengthMismatch`] if its length differs
    ///   from the column count
    /// - [`Error::IndexLengthMismatch`] if the index length differs from
    ///   the row count
    pub fn try_new(
        data: impl Into<TableData>,
        header: Option<LabelsInput>,
        index: Option<LabelsInput>,
    ) -> Result<Self> {
        let (segments, keys) = match data.into() {
            TableData::Single(batch) => (vec![batch], None),
            TableData::Segments(batches) => (batches, None),
            TableData::Labeled(pairs) => {
                let (keys, batches): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
                (batches, Some(keys))
            }
        };

        let (n_rows, n_cols_per_segment) = validate_segments(&segments)?;
        let mapper = ColumnIndexMapper::new(n_cols_per_segment);

        let header = match (keys, header) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_header(
                    "labeled segments synthesize their own header",
                ))
            }
            (Some(keys), None) => Some(
                keys.into_iter()
                    .zip(mapper.n_cols_per_segment())
                    .flat_map(|(key, &n)| std::iter::repeat(key).take(n))
                    .collect(),
            ),
            (None, header) => header.map(LabelsInput::into_labels),
        };

        Self::from_parts(segments, mapper, n_rows, header, index.map(LabelsInput::into_labels))
    }

    /// Build a single-segment table without labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] if the batch has no elements.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::try_new(batch, None, None)
    }

    /// Build a multi-segment table without labels.
    ///
    /// # Errors
    ///
    /// See [`Table::try_new`].
    pub fn from_segments(batches: Vec<RecordBatch>) -> Result<Self> {
        Self::try_new(batches, None, None)
    }

    /// Build a table from labeled segments, synthesizing the header.
    ///
    /// # Errors
    ///
    /// See [`Table::try_new`].
    pub fn from_labeled<L: Into<Label>>(pairs: Vec<(L, RecordBatch)>) -> Result<Self> {
        Self::try_new(pairs, None, None)
    }

    /// Replace the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeaderLengthMismatch`] if the label count differs
    /// from the column count.
    pub fn with_header(self, header: impl Into<LabelsInput>) -> Result<Self> {
        let header = header.into().into_labels();
        check_header_len(&header, self.n_cols())?;
        Ok(Self {
            header: Some(header),
            ..self
        })
    }

    /// Replace the row index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexLengthMismatch`] if the label count differs
    /// from the row count.
    pub fn with_index(self, index: impl Into<LabelsInput>) -> Result<Self> {
        let index = index.into().into_labels();
        check_index_len(&index, self.n_rows)?;
        Ok(Self {
            index: Some(index),
            ..self
        })
    }

    /// Assemble a table from already normalized parts, checking labels.
    pub(crate) fn from_parts(
        segments: Vec<RecordBatch>,
        mapper: ColumnIndexMapper,
        n_rows: usize,
        header: Option<Vec<Label>>,
        index: Option<Vec<Label>>,
    ) -> Result<Self> {
        if let Some(header) = &header {
            check_header_len(header, mapper.n_cols())?;
        }
        if let Some(index) = &index {
            check_index_len(index, n_rows)?;
        }

        tracing::debug!(
            n_rows,
            n_cols = mapper.n_cols(),
            n_arrs = segments.len(),
            has_header = header.is_some(),
            has_index = index.is_some(),
            "built table"
        );

        Ok(Self {
            segments,
            mapper,
            n_rows,
            header,
            index,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Total number of columns across all segments.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.mapper.n_cols()
    }

    /// Number of backing segments.
    #[inline]
    pub fn n_arrs(&self) -> usize {
        self.segments.len()
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols())
    }

    /// Column count of each segment, parallel to [`Table::segments`].
    #[inline]
    pub fn n_cols_per_segment(&self) -> &[usize] {
        self.mapper.n_cols_per_segment()
    }

    /// The backing segments.
    #[inline]
    pub fn segments(&self) -> &[RecordBatch] {
        &self.segments
    }

    /// The column mapper for this table's segment layout.
    #[inline]
    pub fn column_mapper(&self) -> &ColumnIndexMapper {
        &self.mapper
    }

    /// Column labels, one per global column.
    #[inline]
    pub fn header(&self) -> Option<&[Label]> {
        self.header.as_deref()
    }

    /// Row labels, one per row.
    #[inline]
    pub fn index(&self) -> Option<&[Label]> {
        self.index.as_deref()
    }

    /// Numeric column positions, `0..n_cols`.
    #[inline]
    pub fn header_num(&self) -> Range<usize> {
        0..self.n_cols()
    }

    /// Numeric row positions, `0..n_rows`.
    #[inline]
    pub fn index_num(&self) -> Range<usize> {
        0..self.n_rows
    }

    /// The Arrow array holding a global column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnIndexOutOfBounds`] for an out-of-range index.
    pub fn column(&self, col: isize) -> Result<&ArrayRef> {
        let loc = self.mapper.resolve(col)?;
        Ok(self.array_at(loc))
    }

    /// Text of a single cell; both positions may be negative.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] for a bad row and
    /// [`Error::ColumnIndexOutOfBounds`] for a bad column.
    pub fn cell(&self, row: isize, col: isize) -> Result<String> {
        let row = normalize_position(row, self.n_rows, Axis::Rows)?;
        let array = self.column(col)?;
        Ok(format_array_value(array.as_ref(), row).unwrap_or_default())
    }

    /// Text of every cell in a global column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnIndexOutOfBounds`] for an out-of-range index.
    pub fn column_text(&self, col: isize) -> Result<Vec<String>> {
        let array = self.column(col)?;
        Ok((0..self.n_rows)
            .map(|row| format_array_value(array.as_ref(), row).unwrap_or_default())
            .collect())
    }

    pub(crate) fn array_at(&self, loc: ColumnLocation) -> &ArrayRef {
        self.segments[loc.segment].column(loc.local)
    }
}

/// Check segments are non-empty and agree on row count.
///
/// Returns the shared row count and the column count of each segment.
fn validate_segments(segments: &[RecordBatch]) -> Result<(usize, Vec<usize>)> {
    let Some(first) = segments.first() else {
        return Err(Error::empty_data("no segments given"));
    };

    for (i, batch) in segments.iter().enumerate() {
        if batch.num_rows() == 0 || batch.num_columns() == 0 {
            return Err(Error::empty_data(format!(
                "segment {i} has shape ({}, {})",
                batch.num_rows(),
                batch.num_columns()
            )));
        }
    }

    let n_rows = first.num_rows();
    let mut n_cols_per_segment = Vec::with_capacity(segments.len());
    for (i, batch) in segments.iter().enumerate() {
        if batch.num_rows() != n_rows {
            return Err(Error::RowCountMismatch {
                expected: n_rows,
                found: batch.num_rows(),
                segment: i,
            });
        }
        n_cols_per_segment.push(batch.num_columns());
    }

    Ok((n_rows, n_cols_per_segment))
}

fn check_header_len(header: &[Label], n_cols: usize) -> Result<()> {
    if header.len() == n_cols {
        Ok(())
    } else {
        Err(Error::HeaderLengthMismatch {
            len: header.len(),
            n_cols,
        })
    }
}

fn check_index_len(index: &[Label], n_rows: usize) -> Result<()> {
    if index.len() == n_rows {
        Ok(())
    } else {
        Err(Error::IndexLengthMismatch {
            len: index.len(),
            n_rows,
        })
    }
}
