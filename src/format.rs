//! Cell and column formatting for table previews.
//!
//! Cells are converted to their canonical text form by a dispatch over the
//! Arrow data type; whole columns are then padded to a common width by
//! [`StringFormatter`].

use std::fmt::{Debug, Display};

use arrow::array::{
    Array, ArrowPrimitiveType, BinaryArray, BooleanArray, LargeBinaryArray, LargeStringArray,
    PrimitiveArray, StringArray,
};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::{Error, Result};

/// Text shown for null cells.
pub const NULL_TEXT: &str = "NULL";

/// Format an Arrow array value at the given row index as a display string
///
/// Returns `None` if `row` is past the end of the array. Null values
/// format as [`NULL_TEXT`] and types without a text form as `<type>`.
pub fn format_array_value(array: &dyn Array, row: usize) -> Option<String> {
    if row >= array.len() {
        return None;
    }

    if array.is_null(row) {
        return Some(NULL_TEXT.to_string());
    }

    let formatted = match array.data_type() {
        // String types
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| arr.value(row).to_string()),
        DataType::LargeUtf8 => array
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|arr| arr.value(row).to_string()),

        // Integer types
        DataType::Int8 => display_value::<Int8Type>(array, row),
        DataType::Int16 => display_value::<Int16Type>(array, row),
        DataType::Int32 => display_value::<Int32Type>(array, row),
        DataType::Int64 => display_value::<Int64Type>(array, row),
        DataType::UInt8 => display_value::<UInt8Type>(array, row),
        DataType::UInt16 => display_value::<UInt16Type>(array, row),
        DataType::UInt32 => display_value::<UInt32Type>(array, row),
        DataType::UInt64 => display_value::<UInt64Type>(array, row),

        // Floats use the shortest round-trip form, so 2.0 keeps its point
        DataType::Float32 => debug_value::<Float32Type>(array, row),
        DataType::Float64 => debug_value::<Float64Type>(array, row),

        DataType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| arr.value(row).to_string()),

        DataType::Binary => array
            .as_any()
            .downcast_ref::<BinaryArray>()
            .map(|arr| format_bytes_preview(arr.value(row))),
        DataType::LargeBinary => array
            .as_any()
            .downcast_ref::<LargeBinaryArray>()
            .map(|arr| format_bytes_preview(arr.value(row))),

        DataType::Date32 => display_value::<Date32Type>(array, row).map(|d| format!("date:{d}")),
        DataType::Date64 => {
            display_value::<Date64Type>(array, row).map(|d| format!("date64:{d}"))
        }
        DataType::Timestamp(unit, _) => format_timestamp(array, row, *unit),

        DataType::Null => Some(NULL_TEXT.to_string()),

        other => Some(format!("<{}>", type_name(other))),
    };

    // A failed downcast means the data type lied about the array; show the type
    Some(formatted.unwrap_or_else(|| format!("<{}>", type_name(array.data_type()))))
}

fn display_value<T>(array: &dyn Array, row: usize) -> Option<String>
where
    T: ArrowPrimitiveType,
    T::Native: Display,
{
    array
        .as_any()
        .downcast_ref::<PrimitiveArray<T>>()
        .map(|arr| arr.value(row).to_string())
}

fn debug_value<T>(array: &dyn Array, row: usize) -> Option<String>
where
    T: ArrowPrimitiveType,
    T::Native: Debug,
{
    array
        .as_any()
        .downcast_ref::<PrimitiveArray<T>>()
        .map(|arr| format!("{:?}", arr.value(row)))
}

fn format_timestamp(array: &dyn Array, row: usize, unit: TimeUnit) -> Option<String> {
    let value = match unit {
        TimeUnit::Second => display_value::<TimestampSecondType>(array, row),
        TimeUnit::Millisecond => display_value::<TimestampMillisecondType>(array, row),
        TimeUnit::Microsecond => display_value::<TimestampMicrosecondType>(array, row),
        TimeUnit::Nanosecond => display_value::<TimestampNanosecondType>(array, row),
    };
    value.map(|v| format!("ts:{v}"))
}

/// Get a human-readable type name
fn type_name(dt: &DataType) -> &'static str {
    match dt {
        DataType::Null => "null",
        DataType::Boolean => "bool",
        DataType::Int8 => "i8",
        DataType::Int16 => "i16",
        DataType::Int32 => "i32",
        DataType::Int64 => "i64",
        DataType::UInt8 => "u8",
        DataType::UInt16 => "u16",
        DataType::UInt32 => "u32",
        DataType::UInt64 => "u64",
        DataType::Float16 => "f16",
        DataType::Float32 => "f32",
        DataType::Float64 => "f64",
        DataType::Utf8 => "string",
        DataType::LargeUtf8 => "large_string",
        DataType::Binary => "binary",
        DataType::LargeBinary => "large_binary",
        DataType::Date32 => "date32",
        DataType::Date64 => "date64",
        DataType::Timestamp(_, _) => "timestamp",
        DataType::List(_) => "list",
        DataType::LargeList(_) => "large_list",
        DataType::FixedSizeList(_, _) => "fixed_size_list",
        DataType::Struct(_) => "struct",
        DataType::Map(_, _) => "map",
        DataType::Dictionary(_, _) => "dict",
        _ => "unknown",
    }
}

/// Format binary data as hex preview
fn format_bytes_preview(bytes: &[u8]) -> String {
    if bytes.len() <= 8 {
        format!("0x{}", hex_encode(bytes))
    } else {
        format!("0x{}... ({} bytes)", hex_encode(&bytes[..8]), bytes.len())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut result = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(result, "{b:02x}");
    }
    result
}

/// Calculate the display width of a string
///
/// Uses `unicode-width`, so wide CJK characters count as two columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Converts a sequence of values to strings of a common width.
///
/// Every printed column of a table preview goes through its own formatter
/// call, so widths are per column.
///
/// # Example
///
/// ```
/// use mosaic::StringFormatter;
///
/// let (width, cells) = StringFormatter::default().format(&[1, 22, 333]).unwrap();
/// assert_eq!(width, 3);
/// assert_eq!(cells, vec!["1  ", "22 ", "333"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringFormatter {
    pad: Option<char>,
    min_len: Option<usize>,
}

impl Default for StringFormatter {
    fn default() -> Self {
        Self {
            pad: Some(' '),
            min_len: None,
        }
    }
}

impl StringFormatter {
    /// Create a formatter that pads with the given single character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPadCharacter`] unless `pad` is exactly one
    /// character long, and [`Error::InvalidPadWidth`] if that character does
    /// not occupy exactly one display column.
    pub fn with_pad(pad: &str) -> Result<Self> {
        let mut chars = pad.chars();
        match (chars.next(), chars.next()) {
            // The pad must fill exactly one display column
            (Some(c), None) if c.width() == Some(1) => Ok(Self {
                pad: Some(c),
                min_len: None,
            }),
            (Some(c), None) => Err(Error::InvalidPadWidth {
                pad: c,
                width: c.width().unwrap_or(0),
            }),
            _ => Err(Error::InvalidPadCharacter {
                len: pad.chars().count(),
            }),
        }
    }

    /// Create a formatter that leaves strings unpadded.
    pub fn unpadded() -> Self {
        Self {
            pad: None,
            min_len: None,
        }
    }

    /// Set the minimal width of padded output. Ignored when unpadded.
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = Some(min_len);
        self
    }

    /// Convert every value to text and pad to a common width.
    ///
    /// Returns the common width together with the strings in input order.
    /// When unpadded, the width is the natural maximum and the strings are
    /// returned as converted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if `values` is empty.
    pub fn format<T: Display>(&self, values: &[T]) -> Result<(usize, Vec<String>)> {
        let strings: Vec<String> = values.iter().map(ToString::to_string).collect();
        self.pad_strings(strings)
    }

    /// Pad already converted strings; see [`StringFormatter::format`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if `strings` is empty.
    pub fn pad_strings(&self, strings: Vec<String>) -> Result<(usize, Vec<String>)> {
        let natural = strings
            .iter()
            .map(|s| display_width(s))
            .max()
            .ok_or(Error::EmptyInput)?;

        let Some(pad) = self.pad else {
            return Ok((natural, strings));
        };

        let width = natural.max(self.min_len.unwrap_or(0));
        let padded = strings
            .into_iter()
            .map(|mut s| {
                let missing = width - display_width(&s);
                s.extend(std::iter::repeat(pad).take(missing));
                s
            })
            .collect();
        Ok((width, padded))
    }
}
