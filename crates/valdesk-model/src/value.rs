#![deny(unsafe_code)]

use chrono::NaiveDate;

/// A single stored cell value.
///
/// `Null` is the canonical empty value and is distinct from `Text("")`:
/// displays render `Null` as an empty string, but the stored value stays
/// `Null` across read-modify-write cycles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Text(String),
    Number(f64),
    Flag(bool),
    Date(NaiveDate),
    Null,
}

impl Value {
    /// True when the value carries no usable content: `Null`, or text that
    /// is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Display projection: `Null` becomes the empty string, everything else
    /// its canonical text form.
    pub fn display_string(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Number(number) => format_number(*number),
            Value::Flag(flag) => flag.to_string(),
            Value::Date(date) => date.format("%Y-%m-%d").to_string(),
            Value::Null => String::new(),
        }
    }

    /// Canonical string used to key identifiers in binding maps and to
    /// match condition values in the store. Identical to the display form
    /// except that blank text and `Null` collapse to the same key.
    pub fn key_string(&self) -> String {
        match self {
            Value::Text(text) => text.trim().to_string(),
            other => other.display_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Flag(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_blank_but_distinct_from_empty_text() {
        assert!(Value::Null.is_blank());
        assert!(Value::Text(String::new()).is_blank());
        assert_ne!(Value::Null, Value::Text(String::new()));
    }

    #[test]
    fn display_renders_null_as_empty() {
        assert_eq!(Value::Null.display_string(), "");
        assert_eq!(Value::Flag(true).display_string(), "true");
        assert_eq!(Value::Number(4.0).display_string(), "4");
        assert_eq!(Value::Number(4.5).display_string(), "4.5");
    }

    #[test]
    fn date_renders_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(Value::Date(date).display_string(), "2025-03-09");
    }
}
