use crate::memory::Memory;
use crate::naming::{self, CompactPair};
use crate::node::{Common, Mode, Node, Role, ValueType};
use crate::options::{Options, StateLabels};
use crate::path::{PathParts, has_ending};
use crate::value::{self, Value};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static BASE64_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-zA-Z+/]{4})*(([0-9a-zA-Z+/]{2}==)|([0-9a-zA-Z+/]{3}=))")
        .unwrap_or_else(|e| panic!("built-in pattern is invalid: {e}"))
});

pub fn looks_like_base64(s: &str) -> bool {
    !s.is_empty() && BASE64_SHAPE.is_match(s)
}

/// Decodes base64 text; the result is parsed as JSON when it is JSON.
pub fn decode_base64(s: &str) -> Result<serde_json::Value, crate::Json2StateError> {
    let text = String::from_utf8(STANDARD.decode(s)?)?;
    Ok(value::parse_json(&text).unwrap_or(serde_json::Value::String(text)))
}

/// Builds a node tree from a value without touching the store.
///
/// Reads the engine memory to tell new paths from known ones and to notice
/// type drift; never writes to it.
pub struct Deserializer<'a> {
    options: &'a Options,
    memory: &'a Memory,
    forbidden: &'a Regex,
}

impl<'a> Deserializer<'a> {
    pub fn new(options: &'a Options, memory: &'a Memory, forbidden: &'a Regex) -> Self {
        Self {
            options,
            memory,
            forbidden,
        }
    }

    pub fn deserialize(&self, path: &str, element: &Value) -> Option<Node> {
        if path.is_empty() {
            warn!("Cannot extract to empty path");
            return None;
        }
        if element.is_null() {
            debug!("Cannot extract empty value to path '{}'", path);
            return None;
        }
        let Some(parts) = PathParts::parse(path, self.forbidden) else {
            warn!("Invalid path {}", path);
            return None;
        };
        let write = self.options.write;

        if let Some(mode) = self.skip_mode(&parts) {
            return Some(skipped(parts.path, mode, element, write));
        }

        let cast;
        let element = match element {
            Value::String(s) if self.options.auto_cast => match value::parse_json(s) {
                Some(parsed) => {
                    cast = Value::from(parsed);
                    &cast
                }
                None => element,
            },
            _ => element,
        };

        match element {
            Value::Null => {
                debug!("Cast value of '{}' is null, nothing to extract", parts.path);
                None
            }
            Value::Function(name) => {
                debug!("Found callable '{}' at '{}'", name, parts.path);
                Some(Node::new(parts.path, Mode::SkipFunction, write))
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                let key = parts.leaf.clone();
                let name = self.display_name(&key);
                let state = element.to_json()?;
                Some(self.leaf(parts, &key, &key, name, state))
            }
            Value::Array(items) => Some(self.deserialize_array(&parts.path, "", items)),
            Value::Object(entries) => {
                let mut node = Node::new(parts.path.as_str(), Mode::Create, write);
                node.description = self.description(element);
                for (key, child) in entries {
                    if let Some(child) = self.deserialize(&format!("{}.{}", parts.path, key), child)
                    {
                        node.children.push(child);
                    }
                }
                Some(node)
            }
        }
    }

    /// Builds the node of an array found under `key` below `path`.
    pub fn deserialize_array(&self, path: &str, key: &str, items: &[Value]) -> Node {
        let base = if key.is_empty() {
            path.to_string()
        } else {
            format!("{path}.{key}")
        };
        let mut node = Node::new(base, Mode::Array, self.options.write);

        for (position, item) in items.iter().enumerate() {
            if item.is_null() {
                debug!("Cannot extract empty: {}.{}.{}", path, key, position);
                continue;
            }

            let cast;
            let item = match item {
                Value::String(s) if self.options.auto_cast => match value::parse_json(s) {
                    Some(parsed) => {
                        cast = Value::from(parsed);
                        &cast
                    }
                    None => item,
                },
                _ => item,
            };

            if let Value::String(s) = item
                && !key.is_empty()
            {
                if let Some(child) = self.deserialize(&format!("{path}.{key}.{s}"), item) {
                    node.children.push(child);
                }
                continue;
            }

            let name = naming::entry_name(item, key, position, self.options);
            if !self.options.force_index
                && !name.preferred
                && let Some(pair) = naming::compact_pair(item)
            {
                if let Some(child) = self.compact_leaf(path, key, &pair) {
                    node.children.push(child);
                }
                continue;
            }

            if let Some(child) = self.deserialize(&format!("{path}.{}", name.segment), item) {
                node.children.push(child);
            }
        }
        node
    }

    fn compact_leaf(&self, path: &str, key: &str, pair: &CompactPair<'_>) -> Option<Node> {
        let sub_key = if key.is_empty() {
            pair.name_value.clone()
        } else {
            format!("{key}.{}", pair.name_value)
        };
        let Some(parts) = PathParts::parse(&format!("{path}.{sub_key}"), self.forbidden) else {
            warn!("Invalid path {}.{}", path, sub_key);
            return None;
        };
        if let Some(mode) = self.skip_mode(&parts) {
            return Some(skipped(parts.path, mode, pair.state, self.options.write));
        }
        let state = pair.state.to_json()?;
        let name = pair.display_name();
        Some(self.leaf(parts, &sub_key, &name, name.clone(), state))
    }

    fn skip_mode(&self, parts: &PathParts) -> Option<Mode> {
        if has_ending(&parts.leaf, &self.options.exclude_state_with_ending) {
            return Some(Mode::SkipEnding);
        }
        if self.options.remove_passwords && parts.path.to_lowercase().contains("password") {
            return Some(Mode::SkipPassword);
        }
        None
    }

    fn display_name(&self, key: &str) -> String {
        self.options
            .descriptions
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn description(&self, element: &Value) -> Option<String> {
        let key = self.options.prefered_array_desc.as_deref()?;
        element
            .get(key)
            .filter(|v| v.is_truthy())
            .and_then(Value::scalar_text)
    }

    /// Builds a scalar leaf. `ending_name` is matched against
    /// `makeStateWritableWithEnding`: the path leaf for plain members, the
    /// synthesized `"key value"` name for compact pairs.
    fn leaf(
        &self,
        parts: PathParts,
        key: &str,
        ending_name: &str,
        name: String,
        state: serde_json::Value,
    ) -> Node {
        let path = parts.path;
        let state = match state {
            serde_json::Value::String(s) if self.should_decode(&path, key, &s) => {
                match decode_base64(&s) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!("Cannot parse base64 for {}: {}", path, e);
                        serde_json::Value::String(s)
                    }
                }
            }
            other => other,
        };

        let writable_by_ending =
            has_ending(ending_name, &self.options.make_state_writable_with_ending);
        if writable_by_ending {
            debug!("make state with ending writable: {}", path);
        }
        let write = self.options.write || writable_by_ending;

        let observed = ValueType::of(&state);
        let remembered = self.memory.remembered_type(&path);
        let ty = match remembered {
            Some(prev) if prev != observed => {
                debug!("Type changed for {} from {} to {}", path, prev, observed);
                ValueType::Mixed
            }
            _ => observed,
        };
        let mode = if !self.memory.is_created(&path) || remembered != Some(observed) {
            Mode::Create
        } else {
            Mode::Update
        };

        let common = Common {
            name,
            role: Role::infer(&state, write),
            ty,
            write,
            read: true,
            states: self.labels(&path, key, &state),
            unit: self.options.unit_for(&path, key),
        };
        Node::leaf(path, state, mode, common)
    }

    fn should_decode(&self, path: &str, key: &str, s: &str) -> bool {
        (self.options.parse_base64 && looks_like_base64(s)) || self.options.base64_listed(path, key)
    }

    /// Configured labels merged with learned ones, extended by the current
    /// value when it is not a member yet.
    fn labels(&self, path: &str, key: &str, state: &serde_json::Value) -> Option<StateLabels> {
        let configured = self.options.labels_for(path, key);
        let learned = self.memory.labels(path);
        if configured.is_none() && learned.is_none() {
            return None;
        }
        let mut labels = configured.cloned().unwrap_or_default();
        for (k, v) in learned.into_iter().flatten() {
            labels.entry(k.clone()).or_insert_with(|| v.clone());
        }
        let member = match state {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        labels.entry(member).or_insert_with(|| state.clone());
        Some(labels)
    }
}

fn skipped(path: String, mode: Mode, element: &Value, write: bool) -> Node {
    let mut node = Node::new(path, mode, write);
    if element.is_scalar() {
        node.state = element.to_json();
    }
    node
}
