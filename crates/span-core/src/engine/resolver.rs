//! Evaluador del grafo de operadores.
//!
//! `Resolver::resolve` recorre los nodos alcanzables desde los slots en
//! orden ascendente de id, contra un `SnapshotCache` que vive sólo durante
//! la resolución. Una señal de Skip corta la evaluación; después se
//! ensamblan las selecciones por slot y se aplica la obligatoriedad.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::NodeValue;
use crate::errors::ResolveError;
use crate::graph::{NodeId, OperatorNode, ResolverOp};
use crate::model::Artifact;
use crate::ops;
use crate::resolution::{ResolutionContext, ResolveOutcome, ResolvedSelection, SkipReason};
use crate::store::{MetadataStore, SnapshotCache};

enum Step {
    Value(NodeValue),
    Skip(SkipReason),
}

pub struct Resolver<'s, S: MetadataStore + ?Sized> {
    store: &'s S,
    shuffle_seed: Option<u64>,
}

impl<'s, S: MetadataStore + ?Sized> Resolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store,
               shuffle_seed: None }
    }

    /// Semilla por defecto para nodos `shuffle` sin semilla propia.
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    pub fn resolve(&self, context: &ResolutionContext) -> Result<ResolveOutcome, ResolveError> {
        context.validate()?;
        let graph = context.graph();
        let cache = SnapshotCache::new(self.store);
        let order = graph.ancestors(&context.roots())?;
        let mut values: HashMap<NodeId, NodeValue> = HashMap::with_capacity(order.len());

        for id in order {
            let node = graph.node(id)
                            .ok_or_else(|| ResolveError::InvalidGraph(format!("unknown node {id}")))?;
            match self.evaluate(&cache, node, &values)? {
                Step::Value(value) => {
                    debug!("resolver node={} op={} shape={:?} size={}",
                           id,
                           node.operation_name(),
                           value.shape(),
                           value.len());
                    values.insert(id, value);
                }
                Step::Skip(reason) => {
                    info!("resolver outcome=skip node={} op={} reason=\"{}\"", id, node.operation_name(), reason);
                    return Ok(ResolveOutcome::skip(reason));
                }
            }
        }

        let outcome = assemble(context, &values)?;
        info!("resolver outcome={} selections={} store_calls={}",
              outcome.kind(),
              outcome.selections().len(),
              cache.store_calls());
        Ok(outcome)
    }

    fn evaluate(&self,
                cache: &SnapshotCache<'_, S>,
                node: &OperatorNode,
                values: &HashMap<NodeId, NodeValue>)
                -> Result<Step, ResolveError> {
        let value = match &node.op {
            ResolverOp::Input { query } => NodeValue::List(cache.query_artifacts(query)?),
            ResolverOp::LatestPipelineRunOutputs { pipeline_name, output_key } => {
                NodeValue::List(ops::latest_pipeline_run_outputs(cache, pipeline_name, output_key)?)
            }
            ResolverOp::LatestCreated { n } => NodeValue::List(ops::latest_created(list_input(node, values, 0)?, *n)),
            ResolverOp::LatestVersion { n } => NodeValue::List(ops::latest_version(list_input(node, values, 0)?, *n)),
            ResolverOp::AllSpans => NodeValue::List(ops::all_spans(list_input(node, values, 0)?)),
            ResolverOp::StaticRange(params) => NodeValue::List(ops::static_range(list_input(node, values, 0)?, params)),
            ResolverOp::RollingRange(params) => {
                NodeValue::List(ops::rolling_range(list_input(node, values, 0)?, params))
            }
            ResolverOp::SequentialRollingRange(params) => {
                NodeValue::ListOfLists(ops::sequential_rolling_range(list_input(node, values, 0)?, params))
            }
            ResolverOp::Shuffle { seed } => {
                let mut rng = match seed.or(self.shuffle_seed) {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                NodeValue::List(ops::shuffle(list_input(node, values, 0)?, &mut rng))
            }
            ResolverOp::TrainingRange { examples_type } => {
                NodeValue::List(ops::training_range(cache, list_input(node, values, 0)?, examples_type)?)
            }
            ResolverOp::LatestTrained => NodeValue::List(ops::latest_trained(cache, list_input(node, values, 0)?)?),
            ResolverOp::SpanDrivenEvaluatorInputs(params) => {
                let examples = list_input(node, values, 0)?;
                let models = list_input(node, values, 1)?;
                NodeValue::Dict(ops::span_driven_evaluator_inputs(cache, examples, models, params)?.into_dict())
            }
            ResolverOp::Select { key } => {
                let NodeValue::Dict(dict) = input(node, values, 0)? else {
                    return Err(shape_error(node, 0));
                };
                let list = dict.get(key).cloned().ok_or_else(|| {
                                                     ResolveError::InvalidArgument(format!("node {} selects unknown key '{key}'",
                                                                                           node.id))
                                                 })?;
                NodeValue::List(list)
            }
            ResolverOp::SkipIfInsufficientSpans { min_spans, required_span } => {
                let found = list_input(node, values, 0)?;
                if let Some(reason) = ops::insufficient_spans(node.id, found, *min_spans, *required_span) {
                    return Ok(Step::Skip(reason));
                }
                NodeValue::List(found.to_vec())
            }
            ResolverOp::SkipIfEmpty => {
                let value = input(node, values, 0)?;
                if value.is_empty() {
                    return Ok(Step::Skip(SkipReason::EmptyResult { node: node.id }));
                }
                value.clone()
            }
        };
        Ok(Step::Value(value))
    }
}

fn input<'v>(node: &OperatorNode, values: &'v HashMap<NodeId, NodeValue>, index: usize) -> Result<&'v NodeValue, ResolveError> {
    let id = node.inputs
                 .get(index)
                 .ok_or_else(|| ResolveError::Internal(format!("node {} has no input {index}", node.id)))?;
    values.get(id)
          .ok_or_else(|| ResolveError::Internal(format!("node {} evaluated before its input {id}", node.id)))
}

fn list_input<'v>(node: &OperatorNode,
                  values: &'v HashMap<NodeId, NodeValue>,
                  index: usize)
                  -> Result<&'v [Artifact], ResolveError> {
    match input(node, values, index)? {
        NodeValue::List(list) => Ok(list),
        _ => Err(shape_error(node, index)),
    }
}

fn shape_error(node: &OperatorNode, index: usize) -> ResolveError {
    ResolveError::Internal(format!("node {} ({}) received an unexpected shape on input {index}",
                                   node.id,
                                   node.operation_name()))
}

/// Ensambla selecciones: listas se difunden, secuencias se combinan por
/// índice y los elementos con slots obligatorios por debajo de su mínimo
/// se descartan.
fn assemble(context: &ResolutionContext, values: &HashMap<NodeId, NodeValue>) -> Result<ResolveOutcome, ResolveError> {
    let mut sequence_len: Option<(usize, &str)> = None;
    for (slot, binding) in context.slots() {
        let value = values.get(&binding.node)
                          .ok_or_else(|| ResolveError::Internal(format!("slot '{slot}' was not evaluated")))?;
        match value {
            NodeValue::List(_) => {}
            NodeValue::ListOfLists(seq) => match sequence_len {
                Some((len, other)) if len != seq.len() => {
                    warn!("resolver shape_mismatch slot={slot} len={} other_slot={other} other_len={len}",
                          seq.len());
                    return Err(ResolveError::InconsistentResultShape(format!("slot '{slot}' has {} element(s) but slot '{other}' has {len}",
                                                                             seq.len())));
                }
                Some(_) => {}
                None => sequence_len = Some((seq.len(), slot.as_str())),
            },
            NodeValue::Dict(_) => {
                return Err(ResolveError::InvalidGraph(format!("slot '{slot}' is bound to a dict-valued node")));
            }
        }
    }

    let count = sequence_len.map_or(1, |(len, _)| len);
    let mut selections = Vec::with_capacity(count);
    let mut short_slot: Option<String> = None;
    'elements: for index in 0..count {
        let mut selection = ResolvedSelection::default();
        for (slot, binding) in context.slots() {
            let artifacts = match &values[&binding.node] {
                NodeValue::List(list) => list.clone(),
                NodeValue::ListOfLists(seq) => seq[index].clone(),
                NodeValue::Dict(_) => Vec::new(),
            };
            if artifacts.len() < binding.min_count {
                warn!("resolver element={index} slot={slot} artifacts={} min_count={} dropped",
                      artifacts.len(),
                      binding.min_count);
                short_slot.get_or_insert_with(|| slot.clone());
                continue 'elements;
            }
            selection.artifacts.insert(slot.clone(), artifacts);
            if let Some(invocation) = &binding.invocation {
                selection.invocations.insert(slot.clone(), invocation.clone());
            }
        }
        selections.push(selection);
    }

    if selections.is_empty() {
        let reason = match short_slot {
            Some(slot) => SkipReason::RequiredSlotEmpty { slot },
            None => SkipReason::NoSelections,
        };
        info!("resolver outcome=skip reason=\"{reason}\"");
        return Ok(ResolveOutcome::skip(reason));
    }
    Ok(match sequence_len {
        None => ResolveOutcome::Trigger { selection: selections.remove(0) },
        Some(_) => ResolveOutcome::TriggerSequence { selections },
    })
}
