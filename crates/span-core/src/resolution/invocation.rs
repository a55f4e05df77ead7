//! Registro explícito de "qué función y qué argumentos construyeron este canal".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::graph::NodeId;
use crate::hashing::hash_value;

/// Argumento posicional de una invocación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationArg {
    /// Nodo hoja (consulta de artifacts).
    Input { node: NodeId, type_name: String },
    /// Salida de otra función canned.
    Channel { node: NodeId, operation: String },
}

impl InvocationArg {
    pub fn node(&self) -> NodeId {
        match self {
            InvocationArg::Input { node, .. } | InvocationArg::Channel { node, .. } => *node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<InvocationArg>,
    #[serde(default)]
    pub kwargs: IndexMap<String, Value>,
}

impl Invocation {
    pub fn new(function: impl Into<String>) -> Self {
        Self { function: function.into(),
               args: Vec::new(),
               kwargs: IndexMap::new() }
    }

    pub fn with_arg(mut self, arg: InvocationArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Hash del JSON canónico de la invocación.
    pub fn fingerprint(&self) -> String {
        hash_value(&json!({ "function": self.function, "args": self.args, "kwargs": self.kwargs }))
    }
}
