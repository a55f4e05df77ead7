//! Constantes del motor de resolución.
//!
//! Agrupa los nombres de propiedades y tipos que los algoritmos de ventana
//! leen de los artifacts, y la versión lógica del motor que participa en el
//! fingerprint de los grafos.

/// Versión lógica del evaluador. Se incluye en `OperatorGraph::fingerprint`
/// para que un cambio incompatible del motor invalide fingerprints previos.
pub const ENGINE_VERSION: &str = "R1.0";

/// Propiedad entera con la coordenada temporal lógica del artifact.
pub const SPAN_PROPERTY: &str = "span";

/// Propiedad entera con la revisión del artifact dentro de su span.
pub const VERSION_PROPERTY: &str = "version";

/// Tipo de artifact que consume un entrenamiento (ver `training_range`).
pub const EXAMPLES_TYPE: &str = "Examples";

/// Tipo de artifact producido por un entrenamiento.
pub const MODEL_TYPE: &str = "Model";

/// Tipo de contexto que agrupa las ejecuciones de un pipeline.
pub const PIPELINE_CONTEXT_TYPE: &str = "pipeline";

/// Claves del resultado conjunto de `span_driven_evaluator_inputs`.
pub const EXAMPLES_KEY: &str = "examples";
pub const MODEL_KEY: &str = "model";
