//! Modelos neutrales leídos del store de metadata (Artifact, Execution,
//! Context) y la consulta declarativa de artifacts.

pub mod artifact;
pub mod execution;
pub mod property;
pub mod query;

pub use artifact::{Artifact, ArtifactId, ArtifactState};
pub use execution::{Context, ContextId, Execution, ExecutionId, LineageAnchor};
pub use property::PropertyValue;
pub use query::{ArtifactQuery, FilterOp, PropertyFilter};
