use crate::error::Json2StateError;
use crate::memory::Memory;
use crate::store::{MemoryStore, StoreObject};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const FILE_MAGIC: &str = "J2S";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFormat {
    magic: String,
    format_version: u32,
    state_hash: [u8; 32],
    objects: BTreeMap<String, StoreObject>,
    memory: Memory,
}

/// Hash over the store objects and the engine memory together.
pub fn snapshot_hash(objects: &BTreeMap<String, StoreObject>, memory: &Memory) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(MemoryStore::compute_state_hash(objects));
    hasher.update(memory.digest());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn save(path: &str, store: &MemoryStore, memory: &Memory) -> Result<()> {
    let snapshot = SnapshotFormat {
        magic: FILE_MAGIC.to_string(),
        format_version: FORMAT_VERSION,
        state_hash: snapshot_hash(store.objects(), memory),
        objects: store.objects().clone(),
        memory: memory.clone(),
    };

    let data = serde_json::to_string_pretty(&snapshot)?;
    let tmp_path = format!("{}.tmp", path);
    fs::write(&tmp_path, data).with_context(|| format!("Failed to write to file: {}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to atomically replace file: {}", path))?;
    Ok(())
}

pub fn load(path: &str) -> Result<(MemoryStore, Memory)> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let snapshot: SnapshotFormat = serde_json::from_str(&data)?;

    if snapshot.magic != FILE_MAGIC {
        return Err(anyhow::anyhow!(Json2StateError::InvalidFileMagic));
    }
    if snapshot.format_version != FORMAT_VERSION {
        return Err(anyhow::anyhow!(Json2StateError::UnsupportedFormatVersion(
            snapshot.format_version
        )));
    }

    let recomputed = snapshot_hash(&snapshot.objects, &snapshot.memory);
    if recomputed != snapshot.state_hash {
        return Err(anyhow::anyhow!(Json2StateError::StateHashMismatch));
    }

    Ok((MemoryStore::from_objects(snapshot.objects), snapshot.memory))
}

/// Loads the snapshot at `path`, or starts empty if there is none.
pub fn load_or_default(path: &str) -> Result<(MemoryStore, Memory)> {
    if exists(path) {
        load(path)
    } else {
        Ok((MemoryStore::new(), Memory::new()))
    }
}

pub fn exists(path: &str) -> bool {
    Path::new(path).exists()
}
