use crate::error::Json2StateError;
use crate::node::{ChannelCommon, Common};
use crate::path::{PathParts, is_within};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// The object store the writer commits to.
///
/// Calls are issued one at a time, in tree order. Any error is logged by
/// the writer and does not stop the rest of the pass.
#[allow(async_fn_in_trait)]
pub trait StateStore {
    async fn create_container_if_absent(
        &mut self,
        path: &str,
        common: &ChannelCommon,
    ) -> Result<(), Json2StateError>;

    async fn create_or_extend_state(
        &mut self,
        path: &str,
        common: &Common,
    ) -> Result<(), Json2StateError>;

    async fn set_state_value(
        &mut self,
        path: &str,
        value: &serde_json::Value,
    ) -> Result<(), Json2StateError>;

    async fn delete_subtree(&mut self, path: &str) -> Result<(), Json2StateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Channel,
    State,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreObject {
    pub kind: ObjectKind,
    pub parent: Option<String>,
    pub common: serde_json::Map<String, serde_json::Value>,
    pub value: Option<serde_json::Value>,
}

/// In-process store keyed by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    objects: BTreeMap<String, StoreObject>,
}

fn common_map<T: Serialize>(
    common: &T,
) -> Result<serde_json::Map<String, serde_json::Value>, Json2StateError> {
    match serde_json::to_value(common)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

fn parent_of(path: &str) -> Result<Option<String>, Json2StateError> {
    let parts =
        PathParts::split(path).ok_or_else(|| Json2StateError::InvalidPath(path.to_string()))?;
    Ok((!parts.root.is_empty()).then_some(parts.root))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: BTreeMap<String, StoreObject>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &BTreeMap<String, StoreObject> {
        &self.objects
    }

    pub fn get(&self, path: &str) -> Option<&StoreObject> {
        self.objects.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    pub fn value(&self, path: &str) -> Option<&serde_json::Value> {
        self.objects.get(path).and_then(|o| o.value.as_ref())
    }

    /// Direct children of `path`, in path order.
    pub fn children(&self, path: &str) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(path))
            .map(|(p, _)| p.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoreObject)> {
        self.objects.iter()
    }

    pub fn compute_state_hash(objects: &BTreeMap<String, StoreObject>) -> [u8; 32] {
        let mut bytes = Vec::new();
        for (path, object) in objects {
            let len = path.len() as u64;
            bytes.extend_from_slice(&len.to_be_bytes());
            bytes.extend_from_slice(path.as_bytes());

            bytes.push(match object.kind {
                ObjectKind::Channel => 0x01,
                ObjectKind::State => 0x02,
            });

            let mut keys: Vec<&String> = object.common.keys().collect();
            keys.sort();
            bytes.extend_from_slice(&(keys.len() as u64).to_be_bytes());
            for key in keys {
                bytes.extend_from_slice(&(key.len() as u64).to_be_bytes());
                bytes.extend_from_slice(key.as_bytes());
                if let Some(v) = object.common.get(key) {
                    let encoded = v.to_string();
                    bytes.extend_from_slice(&(encoded.len() as u64).to_be_bytes());
                    bytes.extend_from_slice(encoded.as_bytes());
                }
            }

            match &object.value {
                Some(v) => {
                    bytes.push(0x01);
                    let encoded = v.to_string();
                    bytes.extend_from_slice(&(encoded.len() as u64).to_be_bytes());
                    bytes.extend_from_slice(encoded.as_bytes());
                }
                None => bytes.push(0x00),
            }
        }

        let digest = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    pub fn state_hash(&self) -> [u8; 32] {
        Self::compute_state_hash(&self.objects)
    }
}

impl StateStore for MemoryStore {
    async fn create_container_if_absent(
        &mut self,
        path: &str,
        common: &ChannelCommon,
    ) -> Result<(), Json2StateError> {
        if self.objects.contains_key(path) {
            return Ok(());
        }
        let object = StoreObject {
            kind: ObjectKind::Channel,
            parent: parent_of(path)?,
            common: common_map(common)?,
            value: None,
        };
        self.objects.insert(path.to_string(), object);
        Ok(())
    }

    async fn create_or_extend_state(
        &mut self,
        path: &str,
        common: &Common,
    ) -> Result<(), Json2StateError> {
        let incoming = common_map(common)?;
        match self.objects.get_mut(path) {
            Some(object) => {
                object.kind = ObjectKind::State;
                for (k, v) in incoming {
                    object.common.insert(k, v);
                }
            }
            None => {
                let object = StoreObject {
                    kind: ObjectKind::State,
                    parent: parent_of(path)?,
                    common: incoming,
                    value: None,
                };
                self.objects.insert(path.to_string(), object);
            }
        }
        Ok(())
    }

    async fn set_state_value(
        &mut self,
        path: &str,
        value: &serde_json::Value,
    ) -> Result<(), Json2StateError> {
        let object = self
            .objects
            .get_mut(path)
            .ok_or_else(|| Json2StateError::StateNotFound(path.to_string()))?;
        if object.kind != ObjectKind::State {
            return Err(Json2StateError::NotAState(path.to_string()));
        }
        object.value = Some(value.clone());
        Ok(())
    }

    async fn delete_subtree(&mut self, path: &str) -> Result<(), Json2StateError> {
        let before = self.objects.len();
        self.objects.retain(|p, _| !is_within(p, path));
        if self.objects.len() == before {
            return Err(Json2StateError::ObjectNotFound(path.to_string()));
        }
        Ok(())
    }
}
