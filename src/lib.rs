//! mosaic - Segmented Column Tables over Arrow Record Batches
//!
//! A [`Table`] stitches several Arrow `RecordBatch` segments with a shared
//! row count into one logical grid. Columns are numbered contiguously
//! across segments, optionally labeled by a header and a row index, and can
//! be sliced positionally along both axes.
//!
//! # Design Principles
//!
//! 1. **Zero-copy** - Segments are kept as Arrow `RecordBatch` values and
//!    never concatenated
//! 2. **Positional** - Every accessor takes global row/column positions,
//!    negative positions count from the end
//! 3. **Bounded output** - Previews touch only the cells they print
//!
//! # Quick Start
//!
//! ```
//! use mosaic::{IndexExpr, PreviewConfig, SliceSpec, Table};
//! use serde_json::json;
//!
//! let table = Table::from_json(
//!     &json!({"left": [[1, 2], [3, 4], [5, 6]], "right": [["a"], ["b"], ["c"]]}),
//!     None,
//!     Some(&json!(["r0", "r1", "r2"])),
//! )?;
//! assert_eq!(table.shape(), (3, 3));
//!
//! // Last column of the second and third rows
//! let sub = table.select(IndexExpr::cells(SliceSpec::new(Some(1), None), -1isize))?;
//! assert_eq!(sub.shape(), (2, 1));
//!
//! let preview = table.render(&PreviewConfig::default().with_max_rows(2))?;
//! assert!(preview.starts_with("Table with size (3, 3)"));
//! # Ok::<(), mosaic::Error>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::float_cmp,
        clippy::similar_names
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod error;
pub mod format;
mod json;
pub mod label;
pub mod mapper;
pub mod render;
pub mod select;
pub mod table;

// Re-export arrow types commonly needed
pub use arrow::{
    array::{ArrayRef, RecordBatch},
    datatypes::{Schema, SchemaRef},
};
pub use error::{Axis, Error, Result};
pub use format::{display_width, format_array_value, StringFormatter, NULL_TEXT};
pub use label::{Label, LabelsInput};
pub use mapper::{ColumnIndexMapper, ColumnLocation};
pub use render::PreviewConfig;
pub use select::{IndexExpr, Selector, SliceSpec};
pub use table::{Table, TableData};
