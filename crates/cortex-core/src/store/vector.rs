//! HNSW vector backend via `usearch`, content-addressed by memory id string key.
//!
//! Directly adapted from the teacher's `search::vector::VectorIndex`: a key<->u64
//! mapping layer over usearch's integer-keyed index, with reserve-before-add to
//! avoid the segfault usearch documents for unreserved capacity.

use std::collections::HashMap;
use std::sync::Mutex;

use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::{CortexError, Result};
use crate::externals::VectorBackend;

const DEFAULT_CONNECTIVITY: usize = 16;
const DEFAULT_EXPANSION_ADD: usize = 128;
const DEFAULT_EXPANSION_SEARCH: usize = 64;

struct KeyMap {
    key_to_id: HashMap<String, u64>,
    id_to_key: HashMap<u64, String>,
    next_id: u64,
}

/// A `usearch`-backed [`VectorBackend`]. All methods take `&self`; interior
/// mutability comes from a single `Mutex` guarding both the index and the key map
/// together, matching the teacher's `Mutex<VectorIndex>` field on `Storage`.
pub struct UsearchBackend {
    index: Mutex<Index>,
    keys: Mutex<KeyMap>,
    dimensions: usize,
}

impl UsearchBackend {
    pub fn new(dimensions: usize) -> Result<Self> {
        let options = IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: DEFAULT_CONNECTIVITY,
            expansion_add: DEFAULT_EXPANSION_ADD,
            expansion_search: DEFAULT_EXPANSION_SEARCH,
            multi: false,
        };
        let index = Index::new(&options)
            .map_err(|e| CortexError::fatal(format!("vector index creation failed: {e}")))?;
        Ok(Self {
            index: Mutex::new(index),
            keys: Mutex::new(KeyMap {
                key_to_id: HashMap::new(),
                id_to_key: HashMap::new(),
                next_id: 0,
            }),
            dimensions,
        })
    }

    fn reserve_for(&self, index: &Index, additional: usize) -> Result<()> {
        let size = index.size();
        let capacity = index.capacity();
        if size + additional > capacity {
            let new_capacity = std::cmp::max(capacity * 2, size + additional).max(16);
            index
                .reserve(new_capacity)
                .map_err(|e| CortexError::fatal(format!("vector index reserve failed: {e}")))?;
        }
        Ok(())
    }
}

impl VectorBackend for UsearchBackend {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(CortexError::validation(format!(
                "embedding has {} dims, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        let index = self.index.lock().expect("vector index lock poisoned");
        let mut keys = self.keys.lock().expect("vector key map lock poisoned");

        if let Some(&existing) = keys.key_to_id.get(id) {
            index
                .remove(existing)
                .map_err(|e| CortexError::fatal(format!("vector remove failed: {e}")))?;
            self.reserve_for(&index, 1)?;
            index
                .add(existing, vector)
                .map_err(|e| CortexError::fatal(format!("vector add failed: {e}")))?;
            return Ok(());
        }

        self.reserve_for(&index, 1)?;
        let new_id = keys.next_id;
        keys.next_id += 1;
        index
            .add(new_id, vector)
            .map_err(|e| CortexError::fatal(format!("vector add failed: {e}")))?;
        keys.key_to_id.insert(id.to_string(), new_id);
        keys.id_to_key.insert(new_id, id.to_string());
        Ok(())
    }

    fn search(&self, vector: &[f32], k: usize) -> Result<Vec<(String, f64)>> {
        if vector.len() != self.dimensions {
            return Err(CortexError::validation(format!(
                "query embedding has {} dims, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        let index = self.index.lock().expect("vector index lock poisoned");
        if index.size() == 0 {
            return Ok(Vec::new());
        }
        let results = index
            .search(vector, k)
            .map_err(|e| CortexError::upstream(format!("vector search failed: {e}")))?;
        let keys = self.keys.lock().expect("vector key map lock poisoned");
        let mut out = Vec::with_capacity(results.keys.len());
        for (key, distance) in results.keys.iter().zip(results.distances.iter()) {
            if let Some(string_key) = keys.id_to_key.get(key) {
                out.push((string_key.clone(), *distance as f64));
            }
        }
        Ok(out)
    }

    fn delete(&self, ids: &[String]) -> Result<()> {
        let index = self.index.lock().expect("vector index lock poisoned");
        let mut keys = self.keys.lock().expect("vector key map lock poisoned");
        for id in ids {
            if let Some(internal) = keys.key_to_id.remove(id) {
                keys.id_to_key.remove(&internal);
                let _ = index.remove(internal);
            }
        }
        Ok(())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.index.lock().expect("vector index lock poisoned").size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_then_search_finds_self() {
        let backend = UsearchBackend::new(8).unwrap();
        let v = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        backend.upsert("m1", &v).unwrap();
        let results = backend.search(&v, 5).unwrap();
        assert_eq!(results[0].0, "m1");
        assert!(results[0].1 < 0.01);
    }

    #[test]
    fn delete_removes_from_results() {
        let backend = UsearchBackend::new(8).unwrap();
        let v = vec![1.0; 8];
        backend.upsert("m1", &v).unwrap();
        backend.delete(&["m1".to_string()]).unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn dimension_mismatch_is_validation_error() {
        let backend = UsearchBackend::new(8).unwrap();
        let err = backend.upsert("m1", &[1.0, 2.0]).unwrap_err();
        assert!(err.is_validation());
    }
}
