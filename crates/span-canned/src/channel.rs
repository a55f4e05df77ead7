use serde::{Deserialize, Serialize};
use span_core::graph::{NodeId, OutputShape};
use span_core::resolution::{Invocation, InvocationArg};

/// Handle a un nodo del grafo en construcción.
///
/// Los canales devueltos por funciones canned llevan la invocación que los
/// creó; los de `artifact_query` no. Cada canal recuerda el
/// builder que lo creó y sólo es válido dentro de él.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    builder: u64,
    node: NodeId,
    shape: OutputShape,
    arg: InvocationArg,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invocation: Option<Invocation>,
    #[serde(default)]
    allow_empty: bool,
}

impl Channel {
    pub(crate) fn input(builder: u64, node: NodeId, type_name: &str) -> Self {
        Self { builder,
               node,
               shape: OutputShape::List,
               arg: InvocationArg::Input { node,
                                           type_name: type_name.to_string() },
               invocation: None,
               allow_empty: false }
    }

    pub(crate) fn resolved(builder: u64, node: NodeId, shape: OutputShape, invocation: Invocation) -> Self {
        Self { builder,
               node,
               shape,
               arg: InvocationArg::Channel { node,
                                             operation: invocation.function.clone() },
               invocation: Some(invocation),
               allow_empty: false }
    }

    pub(crate) fn allowing_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub(crate) fn builder(&self) -> u64 {
        self.builder
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn shape(&self) -> OutputShape {
        self.shape
    }

    pub fn invocation(&self) -> Option<&Invocation> {
        self.invocation.as_ref()
    }

    /// Un canal que acepta resultados vacíos se enlaza como slot opcional.
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// Cómo aparece este canal como argumento de otra invocación.
    pub fn as_arg(&self) -> InvocationArg {
        self.arg.clone()
    }
}
