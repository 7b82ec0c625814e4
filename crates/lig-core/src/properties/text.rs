//! Editable text values that remember where they came from.
//!
//! The authoring UI edits several record fields as free text. Converting them
//! back to JSON must not turn an empty box into `0` or a hand-written JSON
//! string into a parsed structure, so both types keep their provenance.

use serde_json::{Number, Value};
use tracing::warn;

/// A field that is numeric on the wire but edited as text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumericText {
    /// Absent, null, or an empty text box. Exports as `null`.
    #[default]
    Empty,
    Number(f64),
    /// Text that does not parse as a number.
    Opaque(String),
}

impl NumericText {
    /// Interprets user-entered text.
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Opaque(text.to_string()),
        }
    }

    /// Interprets a JSON value without coercion: numbers stay numbers and
    /// strings stay strings.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Empty, Self::Number),
            Some(Value::String(s)) if s.is_empty() => Self::Empty,
            Some(Value::String(s)) => Self::Opaque(s.clone()),
            Some(other) => Self::Opaque(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric value, parsing opaque text when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(*n),
            Self::Opaque(s) => s.trim().parse().ok(),
        }
    }

    /// Text shown in an edit box.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Opaque(s) => s.clone(),
        }
    }

    /// Export for fields the server expects as numbers.
    ///
    /// Opaque text that still parses is sent as a number. Anything else is
    /// sent unchanged and logged.
    pub fn to_json_coerced(&self, field: &str) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Number(n) => number(*n),
            Self::Opaque(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => number(n),
                _ => {
                    warn!(field, value = %s, "Non-numeric text kept as string");
                    Value::String(s.clone())
                }
            },
        }
    }

    /// Export for fields the server stores as free-form values.
    pub fn to_json_verbatim(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Number(n) => number(*n),
            Self::Opaque(s) => Value::String(s.clone()),
        }
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// `actions`, `events` and `sub_events`: structured JSON or raw text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StructuredText {
    /// Not present in the record. Export leaves the key untouched.
    #[default]
    Absent,
    Structured(Value),
    Raw(String),
}

impl StructuredText {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(s)) => Self::Raw(s.clone()),
            Some(other) => Self::Structured(other.clone()),
        }
    }

    /// Stores edited text, parsing it as JSON first.
    pub fn set_text(&mut self, text: &str) {
        *self = match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(text.to_string()),
        };
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Structured(value) => value.to_string(),
            Self::Raw(s) => s.clone(),
        }
    }

    /// `None` when absent.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Structured(value) => Some(value.clone()),
            Self::Raw(s) => Some(Value::String(s.clone())),
        }
    }
}
