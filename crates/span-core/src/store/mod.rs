//! Adaptador del store de metadata y sus implementaciones.
//!
//! El core sólo consume cuatro operaciones de lectura. Cada llamada devuelve
//! un snapshot al momento de la llamada y no garantiza orden: los
//! algoritmos ordenan explícitamente.

mod memory;
mod snapshot;

pub use memory::InMemoryMetadataStore;
pub use snapshot::SnapshotCache;

use crate::errors::StoreError;
use crate::model::{Artifact, ArtifactId, ArtifactQuery, Context, Execution, LineageAnchor};

/// Lectura de artifacts y linaje desde un store externo.
pub trait MetadataStore {
    /// Artifacts que cumplen `{type, property filters, state}`.
    fn query_artifacts(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError>;

    /// Ejecuciones que consumieron/produjeron el artifact o pertenecen al contexto.
    fn get_lineage(&self, anchor: LineageAnchor) -> Result<Vec<Execution>, StoreError>;

    /// Materializa los ids referenciados por las aristas de linaje. Los ids
    /// desconocidos se omiten.
    fn get_artifacts_by_id(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>, StoreError>;

    /// Contexto identificado por `(type_name, name)`, si existe.
    fn get_context(&self, type_name: &str, name: &str) -> Result<Option<Context>, StoreError>;
}

impl<T: MetadataStore + ?Sized> MetadataStore for &T {
    fn query_artifacts(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError> {
        (**self).query_artifacts(query)
    }

    fn get_lineage(&self, anchor: LineageAnchor) -> Result<Vec<Execution>, StoreError> {
        (**self).get_lineage(anchor)
    }

    fn get_artifacts_by_id(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>, StoreError> {
        (**self).get_artifacts_by_id(ids)
    }

    fn get_context(&self, type_name: &str, name: &str) -> Result<Option<Context>, StoreError> {
        (**self).get_context(type_name, name)
    }
}
