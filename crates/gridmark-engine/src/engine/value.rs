//! Cell values and their coercions.
//!
//! A grid cell holds one of a small set of shapes: nothing, a number, a
//! string, or a `{value, label}` pair coming from dropdown-style columns.
//! Two coercions matter to the rest of the engine:
//!
//! - [`CellValue::coerce_number`] mirrors what a host scripting layer does
//!   when it turns a stored value into a number (trimmed decimal text,
//!   empty text and null become `0`, everything else is invalid).
//! - [`parse_lenient_number`] strips currency symbols and thousands
//!   separators before parsing, and never fails.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A single stored cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
    /// Object-shaped value, e.g. a dropdown option `{ value, label }`.
    Labeled {
        value: Option<String>,
        label: Option<String>,
    },
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> CellValue {
        CellValue::Text(s.into())
    }

    pub fn labeled(value: Option<&str>, label: Option<&str>) -> CellValue {
        CellValue::Labeled {
            value: value.map(str::to_string),
            label: label.map(str::to_string),
        }
    }

    /// Coerce to a number the way a dynamic host would.
    /// Returns None when the result would be NaN.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => Some(0.0),
            CellValue::Number(n) if n.is_nan() => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => coerce_text(s),
            CellValue::Labeled { .. } => None,
        }
    }

    /// String used for ordering in the alphanumeric comparator.
    /// Objects prefer `value`, then `label`, then the empty string.
    pub fn sort_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Labeled { value, label } => {
                Some(value.clone().or_else(|| label.clone()).unwrap_or_default())
            }
            other => Some(other.display_text()),
        }
    }

    /// Plain string rendering, ignoring any rich formatting.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => format_plain_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Labeled { value, label } => label
                .as_deref()
                .or(value.as_deref())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// True for the shapes that can be laid out as wrapped text.
    pub fn is_wrappable(&self) -> bool {
        matches!(self, CellValue::Number(_) | CellValue::Text(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

fn format_plain_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // f64's Display already drops a trailing ".0"
        format!("{}", n)
    }
}

fn coerce_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if !decimal_re().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn decimal_re() -> &'static Regex {
    static DECIMAL_RE: OnceLock<Regex> = OnceLock::new();
    DECIMAL_RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("decimal regex must compile")
    })
}

fn non_numeric_re() -> &'static Regex {
    static NON_NUMERIC_RE: OnceLock<Regex> = OnceLock::new();
    NON_NUMERIC_RE
        .get_or_init(|| Regex::new(r"[^0-9.\-]+").expect("non-numeric regex must compile"))
}

/// Parse user-entered numeric text such as `"$1,234.50"` or `"€ 12"`.
///
/// Everything except digits, `.` and `-` is stripped, then the longest
/// parseable float prefix is taken. Unparsable input yields `0.0`.
pub fn parse_lenient_number(input: &str) -> f64 {
    let stripped = non_numeric_re().replace_all(input, "");
    longest_float_prefix(&stripped).unwrap_or(0.0)
}

/// Numeric form of a value for cached raw values: numbers pass through,
/// everything else goes through [`parse_lenient_number`].
pub fn lenient_number_of(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) | CellValue::Null => 0.0,
        other => parse_lenient_number(&other.display_text()),
    }
}

fn longest_float_prefix(s: &str) -> Option<f64> {
    let mut end = s.len();
    while end > 0 {
        if let Some(prefix) = s.get(..end)
            && let Ok(n) = prefix.parse::<f64>()
            && n.is_finite()
        {
            return Some(n);
        }
        end -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number_text() {
        assert_eq!(CellValue::text("30").coerce_number(), Some(30.0));
        assert_eq!(CellValue::text("  2.5 ").coerce_number(), Some(2.5));
        assert_eq!(CellValue::text("1e3").coerce_number(), Some(1000.0));
        assert_eq!(CellValue::text("").coerce_number(), Some(0.0));
        assert_eq!(CellValue::text("John").coerce_number(), None);
        assert_eq!(CellValue::text("inf").coerce_number(), None);
        assert_eq!(CellValue::text("NaN").coerce_number(), None);
        assert_eq!(CellValue::text("12px").coerce_number(), None);
    }

    #[test]
    fn test_coerce_number_other_shapes() {
        assert_eq!(CellValue::Null.coerce_number(), Some(0.0));
        assert_eq!(CellValue::Number(f64::NAN).coerce_number(), None);
        assert_eq!(CellValue::Number(-4.0).coerce_number(), Some(-4.0));
        assert_eq!(
            CellValue::labeled(Some("1"), Some("One")).coerce_number(),
            None
        );
    }

    #[test]
    fn test_sort_text_prefers_value_then_label() {
        assert_eq!(
            CellValue::labeled(Some("v"), Some("l")).sort_text().as_deref(),
            Some("v")
        );
        assert_eq!(
            CellValue::labeled(None, Some("l")).sort_text().as_deref(),
            Some("l")
        );
        assert_eq!(CellValue::labeled(None, None).sort_text().as_deref(), Some(""));
        assert_eq!(CellValue::Null.sort_text(), None);
        assert_eq!(CellValue::Number(3.0).sort_text().as_deref(), Some("3"));
    }

    #[test]
    fn test_display_text_numbers() {
        assert_eq!(CellValue::Number(30.0).display_text(), "30");
        assert_eq!(CellValue::Number(1.5).display_text(), "1.5");
        assert_eq!(CellValue::Number(-0.25).display_text(), "-0.25");
    }

    #[test]
    fn test_parse_lenient_number() {
        assert_eq!(parse_lenient_number("$1,234.50"), 1234.5);
        assert_eq!(parse_lenient_number("€ 12"), 12.0);
        assert_eq!(parse_lenient_number("-42"), -42.0);
        assert_eq!(parse_lenient_number("1.2.3"), 1.2);
        assert_eq!(parse_lenient_number("abc"), 0.0);
        assert_eq!(parse_lenient_number(""), 0.0);
        assert_eq!(parse_lenient_number("--"), 0.0);
    }

    #[test]
    fn test_lenient_number_of_values() {
        assert_eq!(lenient_number_of(&CellValue::Number(7.0)), 7.0);
        assert_eq!(lenient_number_of(&CellValue::text("USD 9.99")), 9.99);
        assert_eq!(lenient_number_of(&CellValue::Null), 0.0);
    }
}
