//! Contexto de resolución: el grafo más el mapa de slots.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Invocation;
use crate::constants::ENGINE_VERSION;
use crate::errors::ResolveError;
use crate::graph::{NodeId, OperatorGraph, OutputShape};
use crate::hashing::hash_value;

fn default_min_count() -> usize {
    1
}

/// Enlace de un slot de entrada a un nodo del grafo.
///
/// Un slot es obligatorio cuando `min_count > 0`: los elementos de la
/// secuencia donde el slot tenga menos artifacts se descartan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotBinding {
    pub node: NodeId,
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
}

impl SlotBinding {
    pub fn required(node: NodeId) -> Self {
        Self { node,
               min_count: 1,
               invocation: None }
    }

    pub fn optional(node: NodeId) -> Self {
        Self { min_count: 0,
               ..Self::required(node) }
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = Some(invocation);
        self
    }

    pub fn is_required(&self) -> bool {
        self.min_count > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionContext {
    graph: OperatorGraph,
    #[serde(default)]
    slots: IndexMap<String, SlotBinding>,
}

impl ResolutionContext {
    pub fn new(graph: OperatorGraph) -> Self {
        Self { graph,
               slots: IndexMap::new() }
    }

    pub fn graph(&self) -> &OperatorGraph {
        &self.graph
    }

    pub fn slots(&self) -> &IndexMap<String, SlotBinding> {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&SlotBinding> {
        self.slots.get(name)
    }

    /// Nodos enlazados a algún slot, en orden de slot.
    pub fn roots(&self) -> Vec<NodeId> {
        self.slots.values().map(|b| b.node).collect()
    }

    pub fn bind(&mut self, slot: impl Into<String>, binding: SlotBinding) -> Result<(), ResolveError> {
        let slot = slot.into();
        if slot.trim().is_empty() {
            return Err(ResolveError::InvalidArgument("slot name must not be empty".into()));
        }
        if self.slots.contains_key(&slot) {
            return Err(ResolveError::InvalidArgument(format!("slot '{slot}' is already bound")));
        }
        self.check_binding(&slot, &binding)?;
        self.slots.insert(slot, binding);
        Ok(())
    }

    fn check_binding(&self, slot: &str, binding: &SlotBinding) -> Result<(), ResolveError> {
        let node = self.graph
                       .node(binding.node)
                       .ok_or_else(|| ResolveError::InvalidGraph(format!("slot '{slot}' is bound to unknown node {}",
                                                                         binding.node)))?;
        if node.output_shape == OutputShape::Dict {
            return Err(ResolveError::InvalidGraph(format!("slot '{slot}' is bound to {} which produces a dict; select a key first",
                                                          binding.node)));
        }
        Ok(())
    }

    /// Valida grafo y enlaces (contextos deserializados incluidos).
    pub fn validate(&self) -> Result<(), ResolveError> {
        self.graph.validate()?;
        for (slot, binding) in &self.slots {
            self.check_binding(slot, binding)?;
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> String {
        let slots: IndexMap<&String, serde_json::Value> =
            self.slots
                .iter()
                .map(|(name, b)| (name, json!({ "node": b.node, "min_count": b.min_count })))
                .collect();
        hash_value(&json!({ "engine_version": ENGINE_VERSION, "graph": self.graph.fingerprint(), "slots": slots }))
    }
}
