//! Funciones canned: cada una añade sus nodos al grafo y devuelve un canal
//! con la invocación que lo construyó.
//!
//! Los `kwargs` registrados usan los nombres públicos de cada función e
//! incluyen los valores por defecto aplicados.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use span_core::constants::{EXAMPLES_KEY, EXAMPLES_TYPE, MODEL_KEY};
use span_core::graph::{NodeId, ResolverOp, RollingRangeParams, SequentialRollingRangeParams, SpanDrivenParams,
                       StaticRangeParams};
use span_core::resolution::Invocation;
use span_core::ResolveError;

use crate::{Channel, InputBuilder};

impl InputBuilder {
    fn push(&mut self, op: ResolverOp, inputs: &[&Channel]) -> Result<NodeId, ResolveError> {
        for channel in inputs {
            self.check_owned(channel)?;
        }
        let ids: Vec<NodeId> = inputs.iter().map(|c| c.node()).collect();
        self.graph.add_op(op, &ids)
    }

    fn finish(&self, node: NodeId, invocation: Invocation) -> Result<Channel, ResolveError> {
        let shape = self.graph
                        .node(node)
                        .map(|n| n.output_shape)
                        .ok_or_else(|| ResolveError::Internal(format!("node {node} vanished from the graph")))?;
        Ok(Channel::resolved(self.id(), node, shape, invocation))
    }

    /// Los `n` artifacts creados más recientemente.
    pub fn latest_created(&mut self, input: &Channel, n: usize) -> Result<Channel, ResolveError> {
        let node = self.push(ResolverOp::LatestCreated { n }, &[input])?;
        self.finish(node,
                    Invocation::new("latest_created").with_arg(input.as_arg()).with_kwarg("n", n))
    }

    /// Los `n` spans más altos en su última versión.
    pub fn latest_version(&mut self, input: &Channel, n: usize) -> Result<Channel, ResolveError> {
        let node = self.push(ResolverOp::LatestVersion { n }, &[input])?;
        self.finish(node,
                    Invocation::new("latest_version").with_arg(input.as_arg()).with_kwarg("n", n))
    }

    pub fn all_spans(&mut self, input: &Channel) -> Result<Channel, ResolveError> {
        let node = self.push(ResolverOp::AllSpans, &[input])?;
        self.finish(node, Invocation::new("all_spans").with_arg(input.as_arg()))
    }

    /// Rango fijo `[start, end]`. Con `start_span` definido, la resolución
    /// hace Skip si falta ese span o si no están todos los spans no excluidos
    /// del rango.
    pub fn static_range(&mut self, input: &Channel, params: StaticRangeParams) -> Result<Channel, ResolveError> {
        let invocation = Invocation::new("static_range").with_arg(input.as_arg())
                                                        .with_kwarg("start_span_number", params.start_span)
                                                        .with_kwarg("end_span_number", params.end_span)
                                                        .with_kwarg("keep_all_versions", params.keep_all_versions)
                                                        .with_kwarg("exclude_span_numbers",
                                                                    params.exclude_span_numbers.clone());
        let (start_span, end_span) = (params.start_span, params.end_span);
        let excluded: BTreeSet<i64> = params.exclude_span_numbers.iter().copied().collect();
        let mut node = self.push(ResolverOp::StaticRange(params), &[input])?;
        if let Some(start) = start_span {
            let missing = excluded.iter().filter(|s| (start..=end_span).contains(*s)).count();
            let width = end_span.checked_sub(start)
                                .and_then(|d| d.checked_add(1))
                                .and_then(|w| usize::try_from(w).ok())
                                .ok_or_else(|| {
                                    ResolveError::InvalidArgument(format!("static_range [{start}, {end_span}] is too wide"))
                                })?;
            let min_spans = width.saturating_sub(missing);
            let required_span = (!excluded.contains(&start)).then_some(start);
            node = self.graph.add_op(ResolverOp::SkipIfInsufficientSpans { min_spans, required_span }, &[node])?;
        }
        self.finish(node, invocation)
    }

    /// Los `num_spans` spans más tempranos desde `start_span`, descartando los
    /// `skip_num_recent_spans` más recientes. Skip si no hay suficientes.
    pub fn rolling_range(&mut self, input: &Channel, params: RollingRangeParams) -> Result<Channel, ResolveError> {
        let invocation = Invocation::new("rolling_range").with_arg(input.as_arg())
                                                         .with_kwarg("start_span_number", params.start_span)
                                                         .with_kwarg("num_spans", params.num_spans)
                                                         .with_kwarg("skip_num_recent_spans", params.skip_num_recent_spans)
                                                         .with_kwarg("keep_all_versions", params.keep_all_versions);
        let min_spans = params.num_spans;
        let range = self.push(ResolverOp::RollingRange(params), &[input])?;
        let node = self.graph.add_op(ResolverOp::SkipIfInsufficientSpans { min_spans,
                                                                           required_span: None },
                                     &[range])?;
        self.finish(node, invocation)
    }

    /// Secuencia de ventanas deslizantes; cada elemento dirige una ejecución.
    pub fn sequential_rolling_range(&mut self,
                                    input: &Channel,
                                    params: SequentialRollingRangeParams)
                                    -> Result<Channel, ResolveError> {
        let invocation = Invocation::new("sequential_rolling_range").with_arg(input.as_arg())
                                                                    .with_kwarg("start_span_number", params.start_span)
                                                                    .with_kwarg("num_spans", params.num_spans)
                                                                    .with_kwarg("skip_num_recent_spans",
                                                                                params.skip_num_recent_spans)
                                                                    .with_kwarg("keep_all_versions",
                                                                                params.keep_all_versions)
                                                                    .with_kwarg("exclude_span_numbers",
                                                                                params.exclude_span_numbers.clone());
        let node = self.push(ResolverOp::SequentialRollingRange(params), &[input])?;
        self.finish(node, invocation)
    }

    pub fn shuffle(&mut self, input: &Channel, seed: Option<u64>) -> Result<Channel, ResolveError> {
        let node = self.push(ResolverOp::Shuffle { seed }, &[input])?;
        self.finish(node,
                    Invocation::new("shuffle").with_arg(input.as_arg()).with_kwarg("seed", seed))
    }

    /// Examples con los que se entrenó el modelo más reciente.
    pub fn training_range(&mut self, model: &Channel) -> Result<Channel, ResolveError> {
        let node = self.push(ResolverOp::TrainingRange { examples_type: EXAMPLES_TYPE.to_string() },
                             &[model])?;
        self.finish(node, Invocation::new("training_range").with_arg(model.as_arg()))
    }

    /// Artifacts producidos por la ejecución más reciente entre los de la
    /// entrada. Con `raise_skip_signal` un resultado vacío es Skip; sin él el
    /// slot se enlaza como opcional.
    pub fn latest_trained(&mut self, input: &Channel, raise_skip_signal: bool) -> Result<Channel, ResolveError> {
        let invocation = Invocation::new("latest_trained").with_arg(input.as_arg())
                                                          .with_kwarg("raise_skip_signal", raise_skip_signal);
        let trained = self.push(ResolverOp::LatestTrained, &[input])?;
        if raise_skip_signal {
            let node = self.graph.add_op(ResolverOp::SkipIfEmpty, &[trained])?;
            return self.finish(node, invocation);
        }
        Ok(self.finish(trained, invocation)?.allowing_empty())
    }

    /// Salidas de la última ejecución de otro pipeline, un canal por clave de
    /// salida. Un pipeline sin ejecuciones produce listas vacías.
    pub fn latest_pipeline_run_outputs(&mut self,
                                       pipeline_name: &str,
                                       output_keys: &[&str])
                                       -> Result<IndexMap<String, Channel>, ResolveError> {
        if output_keys.is_empty() {
            return Err(ResolveError::InvalidArgument(format!("pipeline '{pipeline_name}' declares no outputs")));
        }
        let mut channels: IndexMap<String, Channel> = IndexMap::with_capacity(output_keys.len());
        for key in output_keys {
            if channels.contains_key(*key) {
                return Err(ResolveError::InvalidArgument(format!("output key '{key}' is repeated")));
            }
            let op = ResolverOp::LatestPipelineRunOutputs { pipeline_name: pipeline_name.to_string(),
                                                            output_key: key.to_string() };
            let node = self.graph.add_op(op, &[])?;
            let invocation = Invocation::new("latest_pipeline_run_outputs").with_kwarg("pipeline_name", pipeline_name)
                                                                           .with_kwarg("output_key", *key);
            channels.insert(key.to_string(), self.finish(node, invocation)?);
        }
        Ok(channels)
    }

    /// Entradas de un evaluador: la ventana de examples más reciente y el
    /// último modelo entrenado antes de ella. Devuelve un canal por slot
    /// (`examples`, `model`).
    pub fn span_driven_evaluator_inputs(&mut self,
                                        examples: &Channel,
                                        models: &Channel,
                                        params: SpanDrivenParams)
                                        -> Result<IndexMap<String, Channel>, ResolveError> {
        let invocation =
            Invocation::new("span_driven_evaluator_inputs").with_arg(examples.as_arg())
                                                           .with_arg(models.as_arg())
                                                           .with_kwarg("wait_spans_before_eval",
                                                                       params.wait_spans_before_eval)
                                                           .with_kwarg("evaluation_training_offset",
                                                                       params.evaluation_training_offset)
                                                           .with_kwarg("additional_spans_per_eval",
                                                                       params.additional_spans_per_eval)
                                                           .with_kwarg("start_span_number", params.start_span_number);
        let joint = self.push(ResolverOp::SpanDrivenEvaluatorInputs(params), &[examples, models])?;
        let mut channels = IndexMap::new();
        for key in [EXAMPLES_KEY, MODEL_KEY] {
            let node = self.graph.add_op(ResolverOp::Select { key: key.to_string() }, &[joint])?;
            channels.insert(key.to_string(), self.finish(node, invocation.clone())?);
        }
        Ok(channels)
    }
}
