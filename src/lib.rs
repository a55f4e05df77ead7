//! spanflow
//!
//! Fachada del workspace: resolución declarativa de qué artifacts alimentan
//! un paso de pipeline a partir de reglas de ventana por span y versión.
//! - `span_core`: modelo, store, grafo de operadores, algoritmos y evaluador.
//! - `span_canned`: construcción de grafos con funciones canned.

pub use span_canned::{Channel, InputBuilder};
pub use span_core::{constants, graph, hashing, model, ops, resolution, store};
pub use span_core::{Artifact, ArtifactQuery, InMemoryMetadataStore, Invocation, InvocationArg, MetadataStore, NodeId,
                    OperatorGraph, ResolutionContext, ResolveError, ResolveOutcome, ResolvedSelection, Resolver,
                    SkipReason, SlotBinding, StoreError};

/// Construye el contexto del builder y lo resuelve contra `store`.
pub fn resolve<S>(store: &S, builder: InputBuilder) -> Result<ResolveOutcome, ResolveError>
    where S: MetadataStore + ?Sized
{
    let context = builder.build()?;
    Resolver::new(store).resolve(&context)
}
