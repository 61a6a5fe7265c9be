//! Comparator factory.
//!
//! [`make_comparator`] turns a sort type, a direction and a field into a
//! two-row comparator. Every comparator is a total order (the multi-column
//! sort relies on a stable `sort_by`):
//!
//! - values that cannot be coerced (unparsable numbers or dates) order
//!   after valid ones ascending, and compare equal among themselves;
//! - nulls and missing fields order after defined values in the
//!   alphanumeric comparator ascending;
//! - descending simply reverses the ascending order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

use super::projection::{SortKeyTable, SyntheticKind};
use super::row::Row;
use super::value::CellValue;

/// How a column is compared.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortType {
    Numeric,
    Date,
    #[default]
    Alphanumeric,
    FillColor,
    FontColor,
}

impl SortType {
    /// Lossy parse: unknown or empty names fall back to alphanumeric.
    pub fn parse(name: &str) -> SortType {
        match name.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" => SortType::Numeric,
            "date" => SortType::Date,
            "fillcolor" | "fill" => SortType::FillColor,
            "fontcolor" | "font" => SortType::FontColor,
            _ => SortType::Alphanumeric,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortType::Numeric => "numeric",
            SortType::Date => "date",
            SortType::Alphanumeric => "alphanumeric",
            SortType::FillColor => "fillColor",
            SortType::FontColor => "fontColor",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SortType {
    fn from(s: String) -> Self {
        SortType::parse(&s)
    }
}

impl From<SortType> for String {
    fn from(t: SortType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(name: &str) -> Option<SortDirection> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// A boxed two-row comparator.
pub type RowComparator<'a> = Box<dyn Fn(&Row, &Row) -> Ordering + 'a>;

/// Build a comparator for `field`. The color comparators read synthetic
/// keys from `keys`, which must come from [`super::preprocess_rows`] over
/// the same snapshot.
pub fn make_comparator<'a>(
    sort_type: SortType,
    direction: SortDirection,
    field: &'a str,
    keys: &'a SortKeyTable,
) -> RowComparator<'a> {
    match sort_type {
        SortType::Numeric => Box::new(move |a: &Row, b: &Row| {
            direction.apply(compare_numeric(a.get(field), b.get(field)))
        }),
        SortType::Date => Box::new(move |a: &Row, b: &Row| {
            direction.apply(compare_dates(a.get(field), b.get(field)))
        }),
        SortType::Alphanumeric => Box::new(move |a: &Row, b: &Row| {
            direction.apply(compare_alphanumeric(a.get(field), b.get(field)))
        }),
        SortType::FillColor => color_comparator(SyntheticKind::FillColor, direction, field, keys),
        SortType::FontColor => color_comparator(SyntheticKind::FontColor, direction, field, keys),
    }
}

fn color_comparator<'a>(
    kind: SyntheticKind,
    direction: SortDirection,
    field: &'a str,
    keys: &'a SortKeyTable,
) -> RowComparator<'a> {
    let Some(column) = keys.column(kind, field) else {
        // no row carries the attribute: every key is ""
        return Box::new(|_: &Row, _: &Row| Ordering::Equal);
    };
    Box::new(move |a: &Row, b: &Row| {
        let ka = column.get(&a.id).map_or("", String::as_str);
        let kb = column.get(&b.id).map_or("", String::as_str);
        direction.apply(ka.cmp(kb))
    })
}

/// Order two optional keys, placing `None` after every `Some`.
fn none_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_numeric(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    let na = a.and_then(CellValue::coerce_number);
    let nb = b.and_then(CellValue::coerce_number);
    none_last(na, nb, |x, y| x.partial_cmp(&y).unwrap_or(Ordering::Equal))
}

fn compare_dates(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    none_last(a.and_then(epoch_millis), b.and_then(epoch_millis), |x, y| {
        x.cmp(&y)
    })
}

fn compare_alphanumeric(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    let sa = a.and_then(CellValue::sort_text);
    let sb = b.and_then(CellValue::sort_text);
    none_last(sa, sb, |x, y| locale_cmp(&x, &y))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y", "%B %d, %Y"];

/// Milliseconds since the Unix epoch. Numbers are taken as epoch millis,
/// text is parsed as RFC 3339 or one of a few common layouts (UTC).
pub fn epoch_millis(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n as i64),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Labeled { value, label } => value
            .as_deref()
            .or(label.as_deref())
            .and_then(|s| parse_date_text(s.trim())),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Locale-style string ordering.
///
/// Both sides are decomposed (NFD). Primary: base letters compared
/// case-insensitively with combining marks dropped. Secondary: unaccented
/// before accented. Tertiary: lowercase before uppercase. Finally the
/// decomposed text, so only canonically equivalent strings compare equal.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let a = CollationKey::new(a);
    let b = CollationKey::new(b);
    a.primary
        .cmp(&b.primary)
        .then_with(|| a.accents.cmp(&b.accents))
        .then_with(|| a.upper.cmp(&b.upper))
        .then_with(|| a.decomposed.cmp(&b.decomposed))
}

struct CollationKey {
    primary: Vec<char>,
    /// Per base char: carries at least one combining mark.
    accents: Vec<bool>,
    upper: Vec<bool>,
    decomposed: Vec<char>,
}

impl CollationKey {
    fn new(s: &str) -> CollationKey {
        let decomposed: Vec<char> = s.nfd().collect();
        let mut key = CollationKey {
            primary: Vec::with_capacity(decomposed.len()),
            accents: Vec::with_capacity(decomposed.len()),
            upper: Vec::with_capacity(decomposed.len()),
            decomposed: Vec::new(),
        };
        for &c in &decomposed {
            if is_combining_mark(c) {
                if let Some(last) = key.accents.last_mut() {
                    *last = true;
                }
                continue;
            }
            key.primary.extend(c.to_lowercase());
            key.accents.push(false);
            key.upper.push(c.is_uppercase());
        }
        key.decomposed = decomposed;
        key
    }
}
