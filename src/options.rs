use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type StateLabels = serde_json::Map<String, serde_json::Value>;

/// Per-call behaviour switches. Deserializes from the camelCase JSON keys
/// host adapters already use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Make every leaf writable.
    pub write: bool,
    /// Name array entries by position only.
    pub force_index: bool,
    pub disable_pad_index: bool,
    pub zero_based_array_index: bool,
    /// Name for the first container created in a pass.
    pub channel_name: Option<String>,
    pub prefered_array_name: Option<String>,
    pub prefered_array_desc: Option<String>,
    /// Parse strings that hold JSON documents.
    pub auto_cast: bool,
    pub descriptions: HashMap<String, String>,
    pub states: HashMap<String, StateLabels>,
    pub units: HashMap<String, String>,
    pub parse_base64: bool,
    #[serde(rename = "parseBase64byIds")]
    pub parse_base64_by_ids: Vec<String>,
    pub delete_before_update: bool,
    pub remove_passwords: bool,
    pub exclude_state_with_ending: Vec<String>,
    pub make_state_writable_with_ending: Vec<String>,
    pub dont_save_created_objects: bool,
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self, crate::Json2StateError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn unit_for(&self, path: &str, key: &str) -> Option<String> {
        self.units.get(path).or_else(|| self.units.get(key)).cloned()
    }

    pub fn labels_for(&self, path: &str, key: &str) -> Option<&StateLabels> {
        self.states.get(path).or_else(|| self.states.get(key))
    }

    pub fn base64_listed(&self, path: &str, key: &str) -> bool {
        self.parse_base64_by_ids
            .iter()
            .any(|id| id == path || id == key)
    }
}
