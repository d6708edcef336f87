//! Error types for mosaic.

/// Result type alias for mosaic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Axis of a table, used to give selection errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The row axis (axis 0).
    Rows,
    /// The column axis (axis 1).
    Columns,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows => write!(f, "rows"),
            Self::Columns => write!(f, "columns"),
        }
    }
}

/// Errors that can occur in mosaic operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input data is not one of the accepted container shapes.
    #[error("Invalid input type: expected {expected}, found {found}")]
    InvalidInputType {
        /// What the caller was allowed to pass.
        expected: String,
        /// What was actually passed.
        found: String,
    },

    /// Input holds no segments, or a segment holds no elements.
    #[error("Table data cannot be empty: {message}")]
    EmptyData {
        /// Which part of the input was empty.
        message: String,
    },

    /// A segment is not exactly two-dimensional.
    #[error("Segment {segment} should have 2 dimensions: {message}")]
    InvalidShape {
        /// Position of the offending segment in the input.
        segment: usize,
        /// Description of the shape that was found.
        message: String,
    },

    /// Segments disagree on their row count.
    #[error("All segments should have equal row count, but found {expected} and {found} (segment {segment})")]
    RowCountMismatch {
        /// Row count of the first segment.
        expected: usize,
        /// Row count of the conflicting segment.
        found: usize,
        /// Position of the conflicting segment.
        segment: usize,
    },

    /// Header is not a scalar or a flat sequence of scalars.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the problem.
        message: String,
    },

    /// Header length does not match the total column count.
    #[error("Header has {len} labels but the table has {n_cols} columns")]
    HeaderLengthMismatch {
        /// Number of header labels supplied.
        len: usize,
        /// Total column count.
        n_cols: usize,
    },

    /// Index is not a scalar or a flat sequence of scalars.
    #[error("Invalid index: {message}")]
    InvalidIndex {
        /// Description of the problem.
        message: String,
    },

    /// Index length does not match the row count.
    #[error("Index has {len} labels but the table has {n_rows} rows")]
    IndexLengthMismatch {
        /// Number of index labels supplied.
        len: usize,
        /// Row count.
        n_rows: usize,
    },

    /// Global column index outside `[-n_cols, n_cols)`.
    #[error("Column index {index} is out of bounds for data with a total of {n_cols} columns")]
    ColumnIndexOutOfBounds {
        /// The requested global column index.
        index: isize,
        /// Total column count.
        n_cols: usize,
    },

    /// Pad string is not exactly one character.
    #[error("Pad string should have length 1 but has length {len}")]
    InvalidPadCharacter {
        /// Character count of the supplied pad string.
        len: usize,
    },

    /// Pad character does not occupy exactly one display column.
    #[error("Pad character {pad:?} should have display width 1 but has width {width}")]
    InvalidPadWidth {
        /// The rejected pad character.
        pad: char,
        /// Its display width.
        width: usize,
    },

    /// No values were given to the string formatter.
    #[error("Cannot format an empty sequence of values")]
    EmptyInput,

    /// Index expression has the wrong number of components.
    #[error("Tables have 2 dimensions, but received an index of {n_dim} dimensions")]
    TooManyIndexDimensions {
        /// Number of components in the index expression.
        n_dim: usize,
    },

    /// Index component is of a kind that cannot select positions.
    #[error("Tables cannot be indexed with {kind}")]
    UnsupportedIndexType {
        /// Description of the rejected component.
        kind: String,
    },

    /// Boolean mask length differs from the axis length.
    #[error("Boolean mask on {axis} has {len} elements, expected {expected}")]
    BooleanMaskLengthMismatch {
        /// Axis the mask was applied to.
        axis: Axis,
        /// Mask length.
        len: usize,
        /// Axis length.
        expected: usize,
    },

    /// Position list is longer than the axis it selects from.
    #[error("Index list on {axis} has {len} elements while the table only has {axis_len} {axis}")]
    IndexLengthExceedsAxis {
        /// Axis the list was applied to.
        axis: Axis,
        /// List length.
        len: usize,
        /// Axis length.
        axis_len: usize,
    },

    /// Position outside `[-len, len)` on an axis.
    #[error("Index {index} is out of bounds for {axis} with size {len}")]
    IndexOutOfBounds {
        /// Axis the position was applied to.
        axis: Axis,
        /// The requested position.
        index: isize,
        /// Axis length.
        len: usize,
    },

    /// Selection resolved to zero rows or zero columns.
    #[error("Selection on {axis} is empty")]
    EmptySelection {
        /// Axis that ended up empty.
        axis: Axis,
    },

    /// Invalid preview configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Arrow error raised by a segment operation.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error while parsing configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input type error.
    pub fn invalid_input_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::InvalidInputType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an empty data error.
    pub fn empty_data(message: impl Into<String>) -> Self {
        Self::EmptyData {
            message: message.into(),
        }
    }

    /// Create an invalid shape error.
    pub fn invalid_shape(segment: usize, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            segment,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid index error.
    pub fn invalid_index(message: impl Into<String>) -> Self {
        Self::InvalidIndex {
            message: message.into(),
        }
    }

    /// Create an unsupported index type error.
    pub fn unsupported_index(kind: impl Into<String>) -> Self {
        Self::UnsupportedIndexType { kind: kind.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_mismatch_reports_both_counts() {
        let err = Error::RowCountMismatch {
            expected: 5,
            found: 7,
            segment: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_column_index_out_of_bounds() {
        let err = Error::ColumnIndexOutOfBounds {
            index: -12,
            n_cols: 11,
        };
        assert!(err.to_string().contains("-12"));
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_index_out_of_bounds_names_axis() {
        let err = Error::IndexOutOfBounds {
            axis: Axis::Rows,
            index: 10,
            len: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("rows"));
    }

    #[test]
    fn test_mask_mismatch() {
        let err = Error::BooleanMaskLengthMismatch {
            axis: Axis::Columns,
            len: 3,
            expected: 4,
        };
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_invalid_pad_character() {
        let err = Error::InvalidPadCharacter { len: 2 };
        assert!(err.to_string().contains("length 2"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(Error::invalid_input_type("array or object", "number")
            .to_string()
            .contains("number"));
        assert!(Error::empty_data("no segments")
            .to_string()
            .contains("no segments"));
        assert!(Error::invalid_shape(1, "found 3 dimensions")
            .to_string()
            .contains("Segment 1"));
        assert!(Error::invalid_header("nested").to_string().contains("nested"));
        assert!(Error::invalid_index("nested").to_string().contains("nested"));
        assert!(Error::unsupported_index("strings")
            .to_string()
            .contains("strings"));
        assert!(Error::invalid_config("max_rows").to_string().contains("max_rows"));
    }

    #[test]
    fn test_too_many_dimensions() {
        let err = Error::TooManyIndexDimensions { n_dim: 3 };
        assert!(err.to_string().contains('3'));
    }
}
