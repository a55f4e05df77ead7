//! Grafo de operadores como datos.
//!
//! Los nodos viven en un arena y se referencian por `NodeId`. Un nodo sólo
//! puede referenciar nodos con id menor (asignación única, acíclico por
//! construcción), por lo que el orden ascendente de ids es un orden
//! topológico válido para el evaluador.

mod node;
mod op;

pub use node::{NodeId, OperatorNode};
pub use op::{OutputShape, ResolverOp, RollingRangeParams, SequentialRollingRangeParams, SpanDrivenParams,
             StaticRangeParams};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::ENGINE_VERSION;
use crate::errors::ResolveError;
use crate::hashing::hash_value;
use crate::model::ArtifactQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorGraph {
    #[serde(default)]
    nodes: Vec<OperatorNode>,
}

impl OperatorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[OperatorNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&OperatorNode> {
        self.nodes.get(id.0)
    }

    pub fn add_input(&mut self, query: ArtifactQuery) -> Result<NodeId, ResolveError> {
        self.add_op(ResolverOp::Input { query }, &[])
    }

    /// Añade un nodo validando literales, aridad, referencias y formas de entrada.
    pub fn add_op(&mut self, op: ResolverOp, inputs: &[NodeId]) -> Result<NodeId, ResolveError> {
        let id = NodeId(self.nodes.len());
        let output_shape = self.check_node(id, &op, inputs)?;
        self.nodes.push(OperatorNode { id,
                                       op,
                                       inputs: inputs.to_vec(),
                                       output_shape });
        Ok(id)
    }

    fn check_node(&self, id: NodeId, op: &ResolverOp, inputs: &[NodeId]) -> Result<OutputShape, ResolveError> {
        op.validate()?;
        if inputs.len() != op.arity() {
            return Err(ResolveError::InvalidArgument(format!("{} expects {} input(s), got {}",
                                                             op.name(),
                                                             op.arity(),
                                                             inputs.len())));
        }
        let mut shapes = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.0 >= id.0 {
                return Err(ResolveError::InvalidGraph(format!("node {id} references {input}, which is not defined before it")));
            }
            let shape = self.nodes[input.0].output_shape;
            if !op.accepts(shape) {
                return Err(ResolveError::InvalidArgument(format!("{} cannot consume a {:?} input from node {input}",
                                                                 op.name(),
                                                                 shape)));
            }
            shapes.push(shape);
        }
        Ok(op.output_shape(&shapes))
    }

    /// Revalida un grafo completo (p.ej. tras deserializarlo).
    pub fn validate(&self) -> Result<(), ResolveError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0 != index {
                return Err(ResolveError::InvalidGraph(format!("node at position {index} is labelled {}", node.id)));
            }
            let shape = self.check_node(node.id, &node.op, &node.inputs)?;
            if shape != node.output_shape {
                return Err(ResolveError::InvalidGraph(format!("node {} declares {:?} output but {} produces {:?}",
                                                              node.id,
                                                              node.output_shape,
                                                              node.op.name(),
                                                              shape)));
            }
        }
        Ok(())
    }

    /// Nodos alcanzables desde `roots` (incluidos), en orden ascendente de id.
    pub fn ancestors(&self, roots: &[NodeId]) -> Result<Vec<NodeId>, ResolveError> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            let node = self.node(id)
                           .ok_or_else(|| ResolveError::InvalidGraph(format!("unknown node {id}")))?;
            if seen.insert(id) {
                stack.extend(node.inputs.iter().copied());
            }
        }
        Ok(seen.into_iter().collect())
    }

    /// Hash blake3 del JSON canónico del grafo y la versión del motor.
    pub fn fingerprint(&self) -> String {
        let nodes = serde_json::to_value(&self.nodes).unwrap_or_default();
        hash_value(&json!({ "engine_version": ENGINE_VERSION, "nodes": nodes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples() -> ArtifactQuery {
        ArtifactQuery::of_type("Examples")
    }

    #[test]
    fn nodes_get_sequential_ids_and_shapes() {
        let mut g = OperatorGraph::new();
        let input = g.add_input(examples()).unwrap();
        let seq = g.add_op(ResolverOp::SequentialRollingRange(SequentialRollingRangeParams { start_span: 0,
                                                                                             num_spans: 2,
                                                                                             skip_num_recent_spans: 0,
                                                                                             keep_all_versions: false,
                                                                                             exclude_span_numbers: vec![] }),
                           &[input])
                   .unwrap();
        let guard = g.add_op(ResolverOp::SkipIfEmpty, &[seq]).unwrap();
        assert_eq!((input, seq, guard), (NodeId(0), NodeId(1), NodeId(2)));
        assert_eq!(g.node(guard).unwrap().output_shape, OutputShape::ListOfLists);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut g = OperatorGraph::new();
        let err = g.add_op(ResolverOp::AllSpans, &[NodeId(0)]).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGraph(_)));
        assert!(g.is_empty());
    }

    #[test]
    fn list_ops_reject_list_of_lists_inputs() {
        let mut g = OperatorGraph::new();
        let input = g.add_input(examples()).unwrap();
        let seq = g.add_op(ResolverOp::SequentialRollingRange(SequentialRollingRangeParams { start_span: 0,
                                                                                             num_spans: 1,
                                                                                             skip_num_recent_spans: 0,
                                                                                             keep_all_versions: false,
                                                                                             exclude_span_numbers: vec![] }),
                           &[input])
                   .unwrap();
        let err = g.add_op(ResolverOp::AllSpans, &[seq]).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(_)));
    }

    #[test]
    fn arity_is_enforced() {
        let mut g = OperatorGraph::new();
        let input = g.add_input(examples()).unwrap();
        let err = g.add_op(ResolverOp::SpanDrivenEvaluatorInputs(SpanDrivenParams::default()), &[input])
                   .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(ref m) if m.contains("expects 2")));
    }

    #[test]
    fn tampered_graph_fails_validation() {
        let mut g = OperatorGraph::new();
        let input = g.add_input(examples()).unwrap();
        g.add_op(ResolverOp::AllSpans, &[input]).unwrap();
        let mut raw = serde_json::to_value(&g).unwrap();
        raw["nodes"][1]["inputs"] = serde_json::json!([1]);
        let tampered: OperatorGraph = serde_json::from_value(raw).unwrap();
        assert!(matches!(tampered.validate(), Err(ResolveError::InvalidGraph(_))));
    }

    #[test]
    fn ancestors_only_cover_reachable_nodes() {
        let mut g = OperatorGraph::new();
        let a = g.add_input(examples()).unwrap();
        let b = g.add_input(ArtifactQuery::of_type("Model")).unwrap();
        let c = g.add_op(ResolverOp::AllSpans, &[a]).unwrap();
        assert_eq!(g.ancestors(&[c]).unwrap(), vec![a, c]);
        assert_eq!(g.ancestors(&[b, c]).unwrap(), vec![a, b, c]);
    }

    #[test]
    fn fingerprint_is_stable_across_serde() {
        let mut g = OperatorGraph::new();
        let a = g.add_input(examples()).unwrap();
        g.add_op(ResolverOp::LatestVersion { n: 1 }, &[a]).unwrap();
        let back: OperatorGraph = serde_json::from_str(&serde_json::to_string(&g).unwrap()).unwrap();
        assert_eq!(g.fingerprint(), back.fingerprint());
        assert_eq!(g.fingerprint().len(), 64);
    }
}
