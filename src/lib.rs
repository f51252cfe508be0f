pub mod deserialize;
pub mod engine;
pub mod error;
pub mod logging;
pub mod memory;
pub mod naming;
pub mod node;
pub mod options;
pub mod path;
pub mod storage;
pub mod store;
pub mod value;
pub mod write;

pub use engine::Json2State;
pub use error::Json2StateError;
pub use memory::Memory;
pub use node::{Mode, Node};
pub use options::Options;
pub use store::{MemoryStore, StateStore};
pub use value::Value;
