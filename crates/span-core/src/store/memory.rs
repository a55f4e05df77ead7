//! Store de metadata en memoria.
//!
//! Adaptador de referencia usado por los tests y por el CLI (se serializa
//! como archivo de snapshot JSON). Asigna ids incrementales y un reloj
//! lógico: cada registro insertado recibe `create_time` un segundo posterior
//! al registro más reciente, de modo que el orden de creación es
//! determinista.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::MetadataStore;
use crate::errors::StoreError;
use crate::model::{Artifact, ArtifactId, ArtifactQuery, Context, ContextId, Execution, LineageAnchor, PropertyValue};

/// 2024-01-01T00:00:00Z; origen del reloj lógico.
const CLOCK_ORIGIN_SECS: i64 = 1_704_067_200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryMetadataStore {
    #[serde(default)]
    artifacts: Vec<Artifact>,
    #[serde(default)]
    executions: Vec<Execution>,
    #[serde(default)]
    contexts: Vec<Context>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    fn next_time(&self) -> DateTime<Utc> {
        let latest = self.artifacts
                         .iter()
                         .map(|a| a.create_time)
                         .chain(self.executions.iter().map(|e| e.create_time))
                         .max();
        let secs = latest.map_or(CLOCK_ORIGIN_SECS, |t| t.timestamp() + 1);
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
    }

    /// Inserta un artifact `LIVE` con las propiedades dadas y lo devuelve con id y `create_time` asignados.
    pub fn put_artifact(&mut self, type_name: &str, properties: &[(&str, PropertyValue)]) -> Artifact {
        let id = self.artifacts.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let mut artifact = Artifact::new(id, type_name, self.next_time()).with_uri(format!("mem://{type_name}/{id}"));
        for (name, value) in properties {
            artifact = artifact.with_property(*name, value.clone());
        }
        self.artifacts.push(artifact.clone());
        artifact
    }

    /// Atajo para artifacts con `span` y `version`.
    pub fn put_spanned(&mut self, type_name: &str, span: i64, version: i64) -> Artifact {
        self.put_artifact(type_name,
                          &[(crate::constants::SPAN_PROPERTY, span.into()),
                            (crate::constants::VERSION_PROPERTY, version.into())])
    }

    /// Inserta un artifact tal cual (id y tiempos incluidos); reemplaza uno existente con el mismo id.
    pub fn insert_artifact(&mut self, artifact: Artifact) {
        self.artifacts.retain(|a| a.id != artifact.id);
        self.artifacts.push(artifact);
    }

    pub fn put_context(&mut self, type_name: &str, name: &str) -> Context {
        if let Some(existing) = self.contexts.iter().find(|c| c.type_name == type_name && c.name == name) {
            return existing.clone();
        }
        let id = self.contexts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let ctx = Context { id,
                            type_name: type_name.to_string(),
                            name: name.to_string() };
        self.contexts.push(ctx.clone());
        ctx
    }

    /// Registra una ejecución con sus eventos de entrada/salida por clave.
    pub fn put_execution(&mut self,
                         type_name: &str,
                         inputs: &[(&str, Vec<ArtifactId>)],
                         outputs: &[(&str, Vec<ArtifactId>)],
                         contexts: &[ContextId])
                         -> Execution {
        let id = self.executions.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let to_map = |events: &[(&str, Vec<ArtifactId>)]| -> IndexMap<String, Vec<ArtifactId>> {
            events.iter().map(|(k, ids)| (k.to_string(), ids.clone())).collect()
        };
        let execution = Execution { id,
                                    type_name: type_name.to_string(),
                                    create_time: self.next_time(),
                                    inputs: to_map(inputs),
                                    outputs: to_map(outputs),
                                    contexts: contexts.to_vec() };
        self.executions.push(execution.clone());
        execution
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn query_artifacts(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError> {
        Ok(self.artifacts.iter().filter(|a| query.matches(a)).cloned().collect())
    }

    fn get_lineage(&self, anchor: LineageAnchor) -> Result<Vec<Execution>, StoreError> {
        let mut found: Vec<Execution> = self.executions
                                            .iter()
                                            .filter(|e| match anchor {
                                                LineageAnchor::Artifact(id) => e.produced(id) || e.consumed(id),
                                                LineageAnchor::Context(id) => e.contexts.contains(&id),
                                            })
                                            .cloned()
                                            .collect();
        found.sort_by_key(|e| e.id);
        Ok(found)
    }

    fn get_artifacts_by_id(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>, StoreError> {
        Ok(ids.iter()
              .filter_map(|id| self.artifacts.iter().find(|a| a.id == *id))
              .cloned()
              .collect())
    }

    fn get_context(&self, type_name: &str, name: &str) -> Result<Option<Context>, StoreError> {
        Ok(self.contexts.iter().find(|c| c.type_name == type_name && c.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_clock_orders_inserts() {
        let mut store = InMemoryMetadataStore::new();
        let a = store.put_spanned("Examples", 0, 0);
        let b = store.put_spanned("Examples", 0, 1);
        assert!(a.creation_key() < b.creation_key());
        assert_eq!(b.id, a.id + 1);
    }

    #[test]
    fn lineage_by_artifact_and_context() {
        let mut store = InMemoryMetadataStore::new();
        let ctx = store.put_context("pipeline", "p");
        let ex = store.put_spanned("Examples", 1, 0);
        let model = store.put_artifact("Model", &[]);
        let exec = store.put_execution("Trainer", &[("examples", vec![ex.id])], &[("model", vec![model.id])], &[ctx.id]);

        let by_model = store.get_lineage(LineageAnchor::Artifact(model.id)).unwrap();
        assert_eq!(by_model, vec![exec.clone()]);
        let by_ctx = store.get_lineage(LineageAnchor::Context(ctx.id)).unwrap();
        assert_eq!(by_ctx, vec![exec]);
        assert!(store.get_lineage(LineageAnchor::Context(ctx.id + 1)).unwrap().is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = InMemoryMetadataStore::new();
        store.put_spanned("Examples", 3, 1);
        let text = serde_json::to_string(&store).unwrap();
        let back: InMemoryMetadataStore = serde_json::from_str(&text).unwrap();
        assert_eq!(back.artifacts(), store.artifacts());
    }

    #[test]
    fn put_context_is_idempotent_by_name() {
        let mut store = InMemoryMetadataStore::new();
        let a = store.put_context("pipeline", "p");
        let b = store.put_context("pipeline", "p");
        assert_eq!(a, b);
        assert_eq!(store.contexts().len(), 1);
        assert_eq!(store.get_context("pipeline", "p").unwrap(), Some(a));
        assert_eq!(store.get_context("pipeline", "q").unwrap(), None);
    }
}
