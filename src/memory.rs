use crate::node::ValueType;
use crate::options::StateLabels;
use crate::path::is_within;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// What one engine instance remembers between passes.
///
/// Only the writer mutates this, and only after the store accepted the
/// corresponding operation. Saved next to the store so a later process
/// resumes with the same view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Memory {
    created: HashSet<String>,
    types: HashMap<String, ValueType>,
    labels: HashMap<String, StateLabels>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_created(&self, path: &str) -> bool {
        self.created.contains(path)
    }

    pub fn remembered_type(&self, path: &str) -> Option<ValueType> {
        self.types.get(path).copied()
    }

    pub fn labels(&self, path: &str) -> Option<&StateLabels> {
        self.labels.get(path)
    }

    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub(crate) fn mark_created(&mut self, path: &str) {
        self.created.insert(path.to_string());
    }

    pub(crate) fn remember_type(&mut self, path: &str, ty: ValueType) {
        self.types.insert(path.to_string(), ty);
    }

    pub(crate) fn remember_labels(&mut self, path: &str, labels: StateLabels) {
        self.labels.insert(path.to_string(), labels);
    }

    /// Forgets `prefix` and everything below it. Returns how many created
    /// paths were dropped.
    pub fn purge(&mut self, prefix: &str) -> usize {
        let before = self.created.len();
        self.created.retain(|p| !is_within(p, prefix));
        self.types.retain(|p, _| !is_within(p, prefix));
        self.labels.retain(|p, _| !is_within(p, prefix));
        before - self.created.len()
    }

    /// SHA-256 over a canonical encoding: every table sorted by path, label
    /// keys sorted.
    pub fn digest(&self) -> [u8; 32] {
        let mut bytes = Vec::new();
        let mut put = |s: &str| {
            bytes.extend_from_slice(&(s.len() as u64).to_be_bytes());
            bytes.extend_from_slice(s.as_bytes());
        };

        let mut created: Vec<&String> = self.created.iter().collect();
        created.sort();
        put("created");
        for path in created {
            put(path);
        }

        let mut types: Vec<(&String, &ValueType)> = self.types.iter().collect();
        types.sort_by(|a, b| a.0.cmp(b.0));
        put("types");
        for (path, ty) in types {
            put(path);
            put(&ty.to_string());
        }

        let mut labels: Vec<(&String, &StateLabels)> = self.labels.iter().collect();
        labels.sort_by(|a, b| a.0.cmp(b.0));
        put("labels");
        for (path, map) in labels {
            put(path);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                put(key);
                if let Some(v) = map.get(key) {
                    put(&v.to_string());
                }
            }
        }

        let digest = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}
