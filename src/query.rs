//! Filter sets and their canonical query-key form.
//!
//! A [`QueryKey`] is both the result-cache key and the label shown in the
//! recent-searches list, so it has to be deterministic and readable:
//!
//! - fields in ascending name order
//! - list values sorted and de-duplicated, one `field=value` pair each
//! - pairs joined with `&`
//! - only `%`, `&` and `=` are escaped (`%25`, `%26`, `%3D`)
//! - the empty filter set is `all workers`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ALL_WORKERS_LABEL;
use crate::error::QueryKeyError;

static FIELD_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// Value of one filter field: free text / select, or a multi-select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Multi(Vec<String>),
}

impl FilterValue {
    /// Blank and whitespace-only values count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Single(v) => v.trim().is_empty(),
            FilterValue::Multi(vs) => vs.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// Values trimmed, blank list entries dropped.
    fn trimmed(self) -> FilterValue {
        match self {
            FilterValue::Single(v) => FilterValue::Single(v.trim().to_string()),
            FilterValue::Multi(vs) => FilterValue::Multi(
                vs.iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    /// Values in canonical order, empty strings dropped.
    pub fn canonical_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = match self {
            FilterValue::Single(v) => vec![v.as_str()],
            FilterValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        };
        values.retain(|v| !v.is_empty());
        values.sort_unstable();
        values.dedup();
        values
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            FilterValue::Single(v) => v == needle,
            FilterValue::Multi(vs) => vs.iter().any(|v| v == needle),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            FilterValue::Single(v) => Some(v),
            FilterValue::Multi(_) => None,
        }
    }

    /// Widen to a list, keeping existing values.
    pub fn into_multi(self) -> FilterValue {
        match self {
            FilterValue::Single(v) => FilterValue::Multi(vec![v]),
            multi => multi,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Single(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Single(v)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(vs: Vec<String>) -> Self {
        FilterValue::Multi(vs)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(vs: Vec<&str>) -> Self {
        FilterValue::Multi(vs.into_iter().map(str::to_string).collect())
    }
}

/// User-selected search criteria keyed by field name.
///
/// Empty values are never stored: clearing a text box or unchecking the last
/// box of a multi-select removes the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.0.get(field)
    }

    /// Text value of a single-valued field, `""` when unset.
    pub fn text(&self, field: &str) -> &str {
        self.get(field).and_then(FilterValue::as_single).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        let field = field.into();
        let value = value.into().trimmed();
        if value.is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, value);
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        self.0.remove(field)
    }

    /// Add or drop one entry of a multi-select field.
    pub fn toggle(&mut self, field: &str, value: &str, checked: bool) {
        let value = value.trim();
        let mut values = match self.0.remove(field) {
            Some(FilterValue::Multi(vs)) => vs,
            Some(FilterValue::Single(v)) => vec![v],
            None => Vec::new(),
        };
        if checked {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else {
            values.retain(|v| v != value);
        }
        self.set(field, values);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FilterValue> {
        self.0.iter()
    }

    /// `(field, value)` pairs in canonical order, one per list entry.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .flat_map(|(field, value)| {
                value
                    .canonical_values()
                    .into_iter()
                    .map(move |v| (field.as_str(), v))
            })
            .collect()
    }

    pub fn encode(&self) -> QueryKey {
        encode(self)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

/// Canonical string form of a [`FilterSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn all_workers() -> Self {
        QueryKey(ALL_WORKERS_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all_workers(&self) -> bool {
        self.0 == ALL_WORKERS_LABEL
    }

    pub fn decode(&self) -> Result<FilterSet, QueryKeyError> {
        decode(&self.0)
    }
}

impl From<String> for QueryKey {
    fn from(s: String) -> Self {
        QueryKey(s)
    }
}

impl From<&str> for QueryKey {
    fn from(s: &str) -> Self {
        QueryKey(s.to_string())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode(filters: &FilterSet) -> QueryKey {
    let pairs = filters.query_pairs();
    if pairs.is_empty() {
        return QueryKey::all_workers();
    }
    let encoded = pairs
        .iter()
        .map(|(field, value)| format!("{}={}", escape(field), escape(value)))
        .collect::<Vec<_>>()
        .join("&");
    QueryKey(encoded)
}

/// Parse a key produced by [`encode`] back into filters.
///
/// A field seen once decodes to `Single`, a repeated field to `Multi`.
pub fn decode(key: &str) -> Result<FilterSet, QueryKeyError> {
    if key.is_empty() || key == ALL_WORKERS_LABEL {
        return Ok(FilterSet::new());
    }

    let mut fields: BTreeMap<String, FilterValue> = BTreeMap::new();
    for pair in key.split('&') {
        let (raw_field, raw_value) = pair
            .split_once('=')
            .ok_or_else(|| QueryKeyError::MalformedPair(pair.to_string()))?;
        let field = unescape(raw_field)?;
        if !FIELD_NAME_REGEX.is_match(&field) {
            return Err(QueryKeyError::InvalidField(field));
        }
        let value = unescape(raw_value)?;
        if value.is_empty() {
            return Err(QueryKeyError::MalformedPair(pair.to_string()));
        }
        match fields.remove(&field) {
            None => {
                fields.insert(field, FilterValue::Single(value));
            }
            Some(existing) => {
                let mut values = match existing.into_multi() {
                    FilterValue::Multi(vs) => vs,
                    FilterValue::Single(v) => vec![v],
                };
                values.push(value);
                fields.insert(field, FilterValue::Multi(values));
            }
        }
    }
    Ok(FilterSet(fields))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(raw: &str) -> Result<String, QueryKeyError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let code: String = chars.by_ref().take(2).collect();
        match code.to_ascii_uppercase().as_str() {
            "25" => out.push('%'),
            "26" => out.push('&'),
            "3D" => out.push('='),
            _ => return Err(QueryKeyError::BadEscape(raw.to_string())),
        }
    }
    Ok(out)
}
