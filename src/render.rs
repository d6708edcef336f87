//! Bounded text previews of tables.
//!
//! A preview shows at most `max_rows` data rows and `max_cols` data columns.
//! Oversized axes are cut into a head and a tail window around a single
//! ellipsis row or column, so rendering only touches the cells it prints.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::{format_array_value, StringFormatter};
use crate::table::Table;

/// Display configuration for table previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Maximum data rows to print
    pub max_rows: usize,
    /// Maximum data columns to print
    pub max_cols: usize,
    /// Separator between printed columns
    pub spacing: String,
    /// Marker for truncated rows and columns
    pub ellipsis: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_rows: 100,
            max_cols: 10,
            spacing: "  ".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

impl PreviewConfig {
    /// Set maximum rows to display
    #[must_use]
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    /// Set maximum columns to display
    #[must_use]
    pub fn with_max_cols(mut self, cols: usize) -> Self {
        self.max_cols = cols;
        self
    }

    /// Set the column separator
    #[must_use]
    pub fn with_spacing(mut self, spacing: impl Into<String>) -> Self {
        self.spacing = spacing.into();
        self
    }

    /// Set the truncation marker
    #[must_use]
    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = ellipsis.into();
        self
    }

    /// Parse a configuration from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON and
    /// [`Error::InvalidConfig`] if the result fails [`PreviewConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the limits leave room for at least one row and column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_rows` or `max_cols` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(Error::invalid_config("max_rows must be positive"));
        }
        if self.max_cols == 0 {
            return Err(Error::invalid_config("max_cols must be positive"));
        }
        Ok(())
    }
}

/// Positions printed along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    head: Range<usize>,
    tail: Range<usize>,
    truncated: bool,
}

/// One printed position: a real row/column or the ellipsis marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Item(usize),
    Ellipsis,
}

impl Window {
    fn new(len: usize, max: usize) -> Self {
        if len > max {
            let first_half = max / 2;
            let second_half = max - first_half;
            Self {
                head: 0..first_half,
                tail: len - second_half..len,
                truncated: true,
            }
        } else {
            Self {
                head: 0..len,
                tail: len..len,
                truncated: false,
            }
        }
    }

    fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.head
            .clone()
            .map(Slot::Item)
            .chain(self.truncated.then_some(Slot::Ellipsis))
            .chain(self.tail.clone().map(Slot::Item))
    }

    /// Printed positions including the ellipsis.
    fn len(&self) -> usize {
        self.head.len() + self.tail.len() + usize::from(self.truncated)
    }
}

impl Table {
    /// Render a bounded text preview of the table.
    ///
    /// The first line is `Table with size (n_rows, n_cols)`, followed by a
    /// blank line and the grid. The grid starts with the row label column
    /// (if the table has an index) and the numeric row column; every data
    /// column is headed by its global position and, if present, its header
    /// label. Each printed column is padded to its own width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a configuration that fails
    /// [`PreviewConfig::validate`].
    pub fn render(&self, config: &PreviewConfig) -> Result<String> {
        config.validate()?;

        let n_cols = self.n_cols();
        let header_present = self.header.is_some();
        let rows = Window::new(self.n_rows, config.max_rows);
        let cols = Window::new(n_cols, config.max_cols);
        tracing::trace!(
            n_rows = self.n_rows,
            n_cols,
            too_many_rows = rows.truncated,
            too_many_cols = cols.truncated,
            "rendering table preview"
        );

        let n_header_rows = 1 + usize::from(header_present);
        let n_rows_print = rows.len() + n_header_rows;
        let ellipsis = || config.ellipsis.clone();

        let mut printed: Vec<Vec<String>> = Vec::with_capacity(cols.len() + 2);

        if let Some(index) = &self.index {
            let mut cells = vec![" ".to_string(); n_header_rows];
            cells.extend(rows.slots().map(|slot| match slot {
                Slot::Item(r) => index[r].to_string(),
                Slot::Ellipsis => ellipsis(),
            }));
            printed.push(cells);
        }

        let mut cells = vec![" ".to_string(); n_header_rows];
        cells.extend(rows.slots().map(|slot| match slot {
            Slot::Item(r) => r.to_string(),
            Slot::Ellipsis => ellipsis(),
        }));
        printed.push(cells);

        for slot in cols.slots() {
            let Slot::Item(c) = slot else {
                printed.push(vec![ellipsis(); n_rows_print]);
                continue;
            };

            // Tail columns are addressed from the end of the table
            let signed = if cols.tail.contains(&c) && cols.truncated {
                c as isize - n_cols as isize
            } else {
                c as isize
            };
            let array = self.array_at(self.mapper.resolve(signed)?);

            let mut cells = Vec::with_capacity(n_rows_print);
            cells.push(c.to_string());
            if let Some(header) = &self.header {
                cells.push(header[c].to_string());
            }
            cells.extend(rows.slots().map(|slot| match slot {
                Slot::Item(r) => format_array_value(array.as_ref(), r).unwrap_or_default(),
                Slot::Ellipsis => ellipsis(),
            }));
            printed.push(cells);
        }

        let formatter = StringFormatter::default();
        let printed = printed
            .into_iter()
            .map(|cells| formatter.pad_strings(cells).map(|(_, padded)| padded))
            .collect::<Result<Vec<_>>>()?;

        let mut out = format!("Table with size ({}, {})\n\n", self.n_rows, n_cols);
        for i in 0..n_rows_print {
            let line: Vec<&str> = printed.iter().map(|col| col[i].as_str()).collect();
            out.push_str(&line.join(&config.spacing));
            out.push('\n');
        }
        Ok(out)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render(&PreviewConfig::default()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
