//! Nodo del grafo de operadores.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OutputShape, ResolverOp};

/// Índice de un nodo dentro del arena de `OperatorGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nodo inmutable: operación tipada, referencias a nodos previos y forma de salida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub id: NodeId,
    pub op: ResolverOp,
    #[serde(default)]
    pub inputs: Vec<NodeId>,
    pub output_shape: OutputShape,
}

impl OperatorNode {
    pub fn operation_name(&self) -> &'static str {
        self.op.name()
    }

    pub fn kwargs(&self) -> IndexMap<String, Value> {
        self.op.kwargs()
    }
}
