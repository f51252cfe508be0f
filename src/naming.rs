//! Path segments for array entries.
//!
//! An entry is named by the last strategy that produces a segment, so an
//! entry keeps its store path when the array is reordered. A configured
//! `preferedArrayName` beats every inferred name and `forceIndex` beats
//! everything.

use crate::options::Options;
use crate::value::Value;

/// Well-known properties, weakest first.
pub const WELL_KNOWN_KEYS: [&str; 5] = ["id", "name", "label", "labelText", "start_date_time"];

type Strategy = fn(&Value) -> Option<String>;

/// Inferred naming strategies in precedence order. Later hits override
/// earlier ones.
const STRATEGIES: [Strategy; 4] = [
    first_string_value,
    id_suffix_keys,
    name_suffix_keys,
    well_known_keys,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub segment: String,
    /// The segment came from `preferedArrayName`.
    pub preferred: bool,
}

/// Names the entry at `position` (0-based) of an array found under `key`.
pub fn entry_name(element: &Value, key: &str, position: usize, options: &Options) -> EntryName {
    if options.force_index {
        return EntryName {
            segment: forced_segment(key, position, options),
            preferred: false,
        };
    }
    if let Some(segment) = preferred_name(element, options) {
        return EntryName {
            segment,
            preferred: true,
        };
    }
    let segment = inferred_name(element)
        .unwrap_or_else(|| format!("{key}{}", pad_index(position + 1, true)));
    EntryName {
        segment,
        preferred: false,
    }
}

pub fn inferred_name(element: &Value) -> Option<String> {
    STRATEGIES.iter().filter_map(|s| s(element)).last()
}

pub fn pad_index(index: usize, pad: bool) -> String {
    if pad && index < 10 {
        format!("0{index}")
    } else {
        index.to_string()
    }
}

pub fn forced_segment(key: &str, position: usize, options: &Options) -> String {
    let index = if options.zero_based_array_index {
        position
    } else {
        position + 1
    };
    let index = pad_index(index, !options.disable_pad_index);
    if key.is_empty() {
        index
    } else {
        format!("{key}.{index}")
    }
}

fn strip_dots(s: &str) -> String {
    s.replace('.', "")
}

fn strip_dots_and_spaces(s: &str) -> String {
    s.replace(['.', ' '], "")
}

pub fn first_string_value(element: &Value) -> Option<String> {
    match element.entries().first() {
        Some((_, Value::String(s))) => Some(s.clone()),
        _ => None,
    }
}

fn suffix_keys(element: &Value, suffix: &str) -> Option<String> {
    element
        .entries()
        .iter()
        .filter(|(k, v)| k.ends_with(suffix) && !v.is_null())
        .filter_map(|(_, v)| v.scalar_text())
        .map(|s| strip_dots(&s))
        .last()
}

pub fn id_suffix_keys(element: &Value) -> Option<String> {
    suffix_keys(element, "Id")
}

pub fn name_suffix_keys(element: &Value) -> Option<String> {
    suffix_keys(element, "Name")
}

pub fn well_known_keys(element: &Value) -> Option<String> {
    WELL_KNOWN_KEYS
        .iter()
        .filter_map(|k| element.get(k))
        .filter(|v| v.is_truthy())
        .filter_map(Value::scalar_text)
        .map(|s| strip_dots(&s))
        .last()
}

/// Resolves `preferedArrayName` against an entry.
///
/// `a+b` joins two properties as `a-b`, `parent/child` reads a nested
/// property, anything else names a flat property.
pub fn preferred_name(element: &Value, options: &Options) -> Option<String> {
    let wanted = options.prefered_array_name.as_deref()?;
    if let Some((first, second)) = wanted.split_once('+') {
        let head = element.get(first)?.scalar_text()?;
        let tail = match second.split_once('/') {
            Some((parent, child)) => element
                .get(parent)
                .and_then(|p| p.get(child))
                .or_else(|| element.get(child))
                .and_then(Value::scalar_text),
            None => element.get(second).and_then(Value::scalar_text),
        }
        .unwrap_or_default();
        return Some(format!(
            "{}-{}",
            strip_dots_and_spaces(&head),
            strip_dots_and_spaces(&tail)
        ));
    }
    if let Some((parent, child)) = wanted.split_once('/') {
        let nested = element
            .get(parent)
            .filter(|p| p.is_truthy())?
            .get(child)?
            .scalar_text()?;
        return Some(strip_dots_and_spaces(&nested));
    }
    let flat = element.get(wanted).filter(|v| v.is_truthy())?.scalar_text()?;
    Some(strip_dots(&flat))
}

/// A two-property entry such as `{"key": "temp", "value": 21}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactPair<'a> {
    pub first_key: &'a str,
    pub second_key: &'a str,
    pub name_value: String,
    pub state: &'a Value,
}

impl CompactPair<'_> {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_key, self.second_key)
    }
}

pub fn compact_pair(element: &Value) -> Option<CompactPair<'_>> {
    let [(first_key, first), (second_key, second)] = element.entries() else {
        return None;
    };
    if !first.is_scalar() || !second.is_scalar() || first.as_str() == Some("null") {
        return None;
    }
    Some(CompactPair {
        first_key,
        second_key,
        name_value: first.scalar_text()?,
        state: second,
    })
}
