use crate::deserialize::Deserializer;
use crate::memory::Memory;
use crate::node::Node;
use crate::options::Options;
use crate::path::default_forbidden_chars;
use crate::store::StateStore;
use crate::value::Value;
use crate::write::write_tree;
use regex::Regex;
use tracing::debug;

/// Keeps a store in sync with JSON values parsed into it.
///
/// One instance should own one store for its whole lifetime: it remembers
/// which paths it already created and which type each state had. When the
/// store outlives the process, persist [`Memory`] with it and hand it back
/// through [`Json2State::with_memory`].
///
/// Diagnostics go through `tracing`. Nothing is printed unless the host
/// installs a subscriber; [`crate::logging::init_console`] installs a
/// stderr one.
pub struct Json2State<S> {
    store: S,
    memory: Memory,
    forbidden: Regex,
}

impl<S: StateStore> Json2State<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            memory: Memory::new(),
            forbidden: default_forbidden_chars(),
        }
    }

    /// Resumes from memory saved by an earlier instance on the same store.
    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    /// Uses the host's pattern of forbidden path characters.
    pub fn with_forbidden_chars(mut self, forbidden: Regex) -> Self {
        self.forbidden = forbidden;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn into_parts(self) -> (S, Memory) {
        (self.store, self.memory)
    }

    pub fn deserialize(&self, path: &str, value: &Value, options: &Options) -> Option<Node> {
        Deserializer::new(options, &self.memory, &self.forbidden).deserialize(path, value)
    }

    pub async fn write(&mut self, node: &Node, options: &Options) {
        write_tree(&mut self.store, &mut self.memory, node, options).await;
    }

    /// Deserializes `value` at `path` and commits the result.
    ///
    /// Never fails; problems are logged and the rest of the tree is still
    /// written.
    pub async fn parse(&mut self, path: &str, value: &Value, options: &Options) {
        let Some(node) = self.deserialize(path, value, options) else {
            debug!("Nothing to write for '{}'", path);
            return;
        };
        debug!("Writing {} nodes below {}", node.count(), node.path);
        self.write(&node, options).await;
    }
}
