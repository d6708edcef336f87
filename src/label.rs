//! Scalar labels for table headers and row indices.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scalar row or column label.
///
/// Labels are printed with their canonical textual form, so a header of
/// `Label::Int(3)` renders the same way as the number `3` in a data cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// Boolean label
    Bool(bool),
    /// Integer label
    Int(i64),
    /// Floating point label
    Float(f64),
    /// Text label
    Str(String),
}

impl Label {
    /// Convert a JSON scalar into a label.
    ///
    /// Returns `None` for `null`, arrays and objects, none of which are
    /// scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Label {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Label {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Label {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Caller-supplied header or index labels.
///
/// A bare scalar is treated as a sequence of length one.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelsInput {
    /// A single label
    Scalar(Label),
    /// An ordered sequence of labels
    Sequence(Vec<Label>),
}

impl LabelsInput {
    /// Flatten into an ordered sequence of labels.
    pub fn into_labels(self) -> Vec<Label> {
        match self {
            Self::Scalar(label) => vec![label],
            Self::Sequence(labels) => labels,
        }
    }
}

impl From<Label> for LabelsInput {
    fn from(label: Label) -> Self {
        Self::Scalar(label)
    }
}

impl From<&str> for LabelsInput {
    fn from(s: &str) -> Self {
        Self::Scalar(Label::from(s))
    }
}

impl<T: Into<Label>> From<Vec<T>> for LabelsInput {
    fn from(labels: Vec<T>) -> Self {
        Self::Sequence(labels.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_canonical() {
        assert_eq!(Label::from(3).to_string(), "3");
        assert_eq!(Label::from(1.5).to_string(), "1.5");
        assert_eq!(Label::from(2.0).to_string(), "2.0");
        assert_eq!(Label::from("abc").to_string(), "abc");
        assert_eq!(Label::from(true).to_string(), "true");
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Label::from_json(&json!(7)), Some(Label::Int(7)));
        assert_eq!(Label::from_json(&json!(0.25)), Some(Label::Float(0.25)));
        assert_eq!(Label::from_json(&json!("x")), Some(Label::from("x")));
        assert_eq!(Label::from_json(&json!(false)), Some(Label::Bool(false)));
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        assert_eq!(Label::from_json(&json!(null)), None);
        assert_eq!(Label::from_json(&json!([1, 2])), None);
        assert_eq!(Label::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_scalar_input_is_length_one() {
        let input = LabelsInput::from("only");
        assert_eq!(input.into_labels(), vec![Label::from("only")]);
    }

    #[test]
    fn test_sequence_input_keeps_order() {
        let input = LabelsInput::from(vec!["b", "a", "c"]);
        let labels: Vec<String> = input
            .into_labels()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_serde_untagged_roundtrip() {
        let labels = vec![Label::from(1), Label::from("a"), Label::from(true)];
        let text = serde_json::to_string(&labels).unwrap();
        assert_eq!(text, r#"[1,"a",true]"#);
        let back: Vec<Label> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, labels);
    }
}
