//! Cache de snapshot por resolución.
//!
//! Dos lecturas idénticas al store dentro de una misma resolución pueden
//! devolver datos distintos. `SnapshotCache` garantiza que cada consulta,
//! cada linaje y cada id se piden al store como máximo una vez y que el
//! resto de la evaluación reutiliza esa lectura.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::MetadataStore;
use crate::errors::StoreError;
use crate::model::{Artifact, ArtifactId, ArtifactQuery, Context, Execution, LineageAnchor};

pub struct SnapshotCache<'s, S: MetadataStore + ?Sized> {
    store: &'s S,
    queries: RefCell<HashMap<String, Vec<Artifact>>>,
    lineage: RefCell<HashMap<LineageAnchor, Vec<Execution>>>,
    artifacts: RefCell<HashMap<ArtifactId, Artifact>>,
    contexts: RefCell<HashMap<(String, String), Option<Context>>>,
    store_calls: Cell<usize>,
}

impl<'s, S: MetadataStore + ?Sized> SnapshotCache<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store,
               queries: RefCell::new(HashMap::new()),
               lineage: RefCell::new(HashMap::new()),
               artifacts: RefCell::new(HashMap::new()),
               contexts: RefCell::new(HashMap::new()),
               store_calls: Cell::new(0) }
    }

    /// Número de llamadas que llegaron al store subyacente.
    pub fn store_calls(&self) -> usize {
        self.store_calls.get()
    }

    fn remember(&self, artifacts: &[Artifact]) {
        let mut by_id = self.artifacts.borrow_mut();
        for a in artifacts {
            by_id.entry(a.id).or_insert_with(|| a.clone());
        }
    }
}

impl<S: MetadataStore + ?Sized> MetadataStore for SnapshotCache<'_, S> {
    fn query_artifacts(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError> {
        let key = query.cache_key();
        if let Some(hit) = self.queries.borrow().get(&key) {
            return Ok(hit.clone());
        }
        self.store_calls.set(self.store_calls.get() + 1);
        let fetched = self.store.query_artifacts(query)?;
        self.remember(&fetched);
        self.queries.borrow_mut().insert(key, fetched.clone());
        Ok(fetched)
    }

    fn get_lineage(&self, anchor: LineageAnchor) -> Result<Vec<Execution>, StoreError> {
        if let Some(hit) = self.lineage.borrow().get(&anchor) {
            return Ok(hit.clone());
        }
        self.store_calls.set(self.store_calls.get() + 1);
        let fetched = self.store.get_lineage(anchor)?;
        self.lineage.borrow_mut().insert(anchor, fetched.clone());
        Ok(fetched)
    }

    fn get_artifacts_by_id(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>, StoreError> {
        let missing: Vec<ArtifactId> = {
            let known = self.artifacts.borrow();
            let mut missing: Vec<ArtifactId> = ids.iter().copied().filter(|id| !known.contains_key(id)).collect();
            missing.sort_unstable();
            missing.dedup();
            missing
        };
        if !missing.is_empty() {
            self.store_calls.set(self.store_calls.get() + 1);
            let fetched = self.store.get_artifacts_by_id(&missing)?;
            self.remember(&fetched);
        }
        let known = self.artifacts.borrow();
        Ok(ids.iter().filter_map(|id| known.get(id).cloned()).collect())
    }

    fn get_context(&self, type_name: &str, name: &str) -> Result<Option<Context>, StoreError> {
        let key = (type_name.to_string(), name.to_string());
        if let Some(hit) = self.contexts.borrow().get(&key) {
            return Ok(hit.clone());
        }
        self.store_calls.set(self.store_calls.get() + 1);
        let fetched = self.store.get_context(type_name, name)?;
        self.contexts.borrow_mut().insert(key, fetched.clone());
        Ok(fetched)
    }
}
