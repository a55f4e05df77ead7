//! span-core: resolución declarativa de artifacts por span y versión.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod hashing;
pub mod model;
pub mod ops;
pub mod resolution;
pub mod store;

pub use engine::{NodeValue, Resolver};
pub use errors::{ResolveError, StoreError};
pub use graph::{NodeId, OperatorGraph, OperatorNode, OutputShape, ResolverOp};
pub use model::{Artifact, ArtifactId, ArtifactQuery, ArtifactState, Execution, LineageAnchor, PropertyValue};
pub use resolution::{Invocation, InvocationArg, ResolutionContext, ResolveOutcome, ResolvedSelection, SkipReason,
                     SlotBinding};
pub use store::{InMemoryMetadataStore, MetadataStore, SnapshotCache};
