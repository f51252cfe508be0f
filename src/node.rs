use crate::options::StateLabels;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Create,
    Update,
    Array,
    SkipEnding,
    SkipPassword,
    SkipFunction,
}

impl Mode {
    pub fn is_skip(self) -> bool {
        matches!(
            self,
            Mode::SkipEnding | Mode::SkipPassword | Mode::SkipFunction
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Update => "update",
            Mode::Array => "array",
            Mode::SkipEnding => "skipEnding",
            Mode::SkipPassword => "skipPassword",
            Mode::SkipFunction => "skipFunction",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "indicator")]
    Indicator,
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "value.time")]
    ValueTime,
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "level")]
    Level,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "state")]
    State,
}

impl Role {
    /// Infers the semantic role of a leaf from its value and writability.
    pub fn infer(value: &serde_json::Value, write: bool) -> Self {
        match value {
            serde_json::Value::Bool(_) if write => Role::Switch,
            serde_json::Value::Bool(_) => Role::Indicator,
            serde_json::Value::Number(_) if write => Role::Level,
            serde_json::Value::Number(n) if is_millis_timestamp(n) => Role::ValueTime,
            serde_json::Value::Number(_) => Role::Value,
            serde_json::Value::String(_) => Role::Text,
            _ => Role::State,
        }
    }
}

/// An integral number of 13 digits in the window of plausible epoch
/// milliseconds. Judged by value, so `1607000000000.0` and `1.607e12` count.
fn is_millis_timestamp(n: &serde_json::Number) -> bool {
    n.as_f64().is_some_and(|f| {
        f.fract() == 0.0 && f > 1_500_000_000_000.0 && f < 2_000_000_000_000.0
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Number,
    String,
    Object,
    Mixed,
}

impl ValueType {
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(_) => ValueType::Boolean,
            serde_json::Value::Number(_) => ValueType::Number,
            serde_json::Value::String(_) => ValueType::String,
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => ValueType::Object,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Metadata of a state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Common {
    pub name: String,
    pub role: Role,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub write: bool,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<StateLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Metadata of a container record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCommon {
    pub name: String,
    pub write: bool,
    pub read: bool,
}

impl ChannelCommon {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            write: false,
            read: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub path: String,
    pub state: Option<serde_json::Value>,
    pub mode: Mode,
    pub common: Option<Common>,
    pub children: Vec<Node>,
    pub write: bool,
    pub description: Option<String>,
}

impl Node {
    pub fn new(path: impl Into<String>, mode: Mode, write: bool) -> Self {
        Self {
            path: path.into(),
            state: None,
            mode,
            common: None,
            children: Vec::new(),
            write,
            description: None,
        }
    }

    pub fn leaf(
        path: impl Into<String>,
        state: serde_json::Value,
        mode: Mode,
        common: Common,
    ) -> Self {
        let write = common.write;
        Self {
            state: Some(state),
            common: Some(common),
            ..Self::new(path, mode, write)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.state.is_some() && self.common.is_some()
    }

    /// Finds a node by path in this subtree.
    pub fn find(&self, path: &str) -> Option<&Node> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}
