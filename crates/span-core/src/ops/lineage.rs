//! Algoritmos que recorren el linaje (ejecuciones) además de las propiedades.
//!
//! "Más reciente" siempre es el orden de creación `(create_time, id)` que
//! asigna el store, tanto para artifacts como para ejecuciones.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::debug;

use super::spans::dedupe_latest_version;
use super::window::span_sorted;
use crate::constants::{EXAMPLES_KEY, EXAMPLES_TYPE, MODEL_KEY, PIPELINE_CONTEXT_TYPE};
use crate::errors::ResolveError;
use crate::graph::SpanDrivenParams;
use crate::model::{Artifact, ArtifactId, Execution, LineageAnchor};
use crate::store::MetadataStore;

/// Resultado conjunto de `span_driven_evaluator_inputs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluatorInputs {
    pub examples: Vec<Artifact>,
    pub model: Vec<Artifact>,
}

impl EvaluatorInputs {
    pub fn into_dict(self) -> IndexMap<String, Vec<Artifact>> {
        let mut dict = IndexMap::new();
        dict.insert(EXAMPLES_KEY.to_string(), self.examples);
        dict.insert(MODEL_KEY.to_string(), self.model);
        dict
    }
}

/// Ejecuciones que produjeron el artifact.
fn producers<S>(store: &S, artifact: ArtifactId) -> Result<Vec<Execution>, ResolveError>
    where S: MetadataStore + ?Sized
{
    Ok(store.get_lineage(LineageAnchor::Artifact(artifact))?
            .into_iter()
            .filter(|e| e.produced(artifact))
            .collect())
}

fn latest_artifact(artifacts: &[Artifact]) -> Option<&Artifact> {
    artifacts.iter().max_by_key(|a| a.creation_key())
}

/// Datos de entrenamiento del modelo más reciente: entradas de tipo
/// `examples_type` de su ejecución productora más reciente, por span.
pub fn training_range<S>(store: &S, models: &[Artifact], examples_type: &str) -> Result<Vec<Artifact>, ResolveError>
    where S: MetadataStore + ?Sized
{
    let Some(model) = latest_artifact(models) else {
        return Ok(Vec::new());
    };
    training_examples(store, model, examples_type)
}

fn latest_producer<S>(store: &S, artifact: ArtifactId) -> Result<Option<Execution>, ResolveError>
    where S: MetadataStore + ?Sized
{
    Ok(producers(store, artifact)?.into_iter().max_by_key(Execution::creation_key))
}

fn training_examples<S>(store: &S, model: &Artifact, examples_type: &str) -> Result<Vec<Artifact>, ResolveError>
    where S: MetadataStore + ?Sized
{
    let Some(trainer) = latest_producer(store, model.id)? else {
        debug!("training_range model_id={} producer=none", model.id);
        return Ok(Vec::new());
    };
    trainer_inputs(store, &trainer, examples_type)
}

fn trainer_inputs<S>(store: &S, trainer: &Execution, examples_type: &str) -> Result<Vec<Artifact>, ResolveError>
    where S: MetadataStore + ?Sized
{
    let ids: Vec<ArtifactId> = trainer.input_ids().collect::<BTreeSet<_>>().into_iter().collect();
    let inputs: Vec<Artifact> = store.get_artifacts_by_id(&ids)?
                                     .into_iter()
                                     .filter(|a| a.type_name == examples_type)
                                     .collect();
    Ok(span_sorted(&inputs))
}

/// Salidas de la ejecución productora más reciente entre las de la entrada,
/// restringidas al conjunto de entrada y en orden de creación.
pub fn latest_trained<S>(store: &S, artifacts: &[Artifact]) -> Result<Vec<Artifact>, ResolveError>
    where S: MetadataStore + ?Sized
{
    let mut executions: BTreeMap<i64, Execution> = BTreeMap::new();
    for artifact in artifacts {
        for execution in producers(store, artifact.id)? {
            executions.entry(execution.id).or_insert(execution);
        }
    }
    let Some(latest) = executions.into_values().max_by_key(Execution::creation_key) else {
        return Ok(Vec::new());
    };
    let mut out: Vec<Artifact> = artifacts.iter().filter(|a| latest.produced(a.id)).cloned().collect();
    out.sort_by_key(Artifact::creation_key);
    out.dedup_by_key(|a| a.id);
    Ok(out)
}

/// Salidas `output_key` de la ejecución más reciente del pipeline que las
/// publicó, en el orden del evento. Un pipeline desconocido o sin esa
/// salida da una lista vacía.
pub fn latest_pipeline_run_outputs<S>(store: &S,
                                      pipeline_name: &str,
                                      output_key: &str)
                                      -> Result<Vec<Artifact>, ResolveError>
    where S: MetadataStore + ?Sized
{
    let Some(context) = store.get_context(PIPELINE_CONTEXT_TYPE, pipeline_name)? else {
        debug!("pipeline_run pipeline={pipeline_name} context=none");
        return Ok(Vec::new());
    };
    let latest = store.get_lineage(LineageAnchor::Context(context.id))?
                      .into_iter()
                      .filter(|e| e.outputs.get(output_key).is_some_and(|ids| !ids.is_empty()))
                      .max_by_key(Execution::creation_key);
    let Some(run) = latest else {
        debug!("pipeline_run pipeline={pipeline_name} key={output_key} execution=none");
        return Ok(Vec::new());
    };
    let ids = run.outputs.get(output_key).cloned().unwrap_or_default();
    debug!("pipeline_run pipeline={pipeline_name} key={output_key} execution_id={} outputs={}",
           run.id,
           ids.len());
    Ok(store.get_artifacts_by_id(&ids)?)
}

/// Ventana de evaluación anclada en el span más reciente y el modelo más
/// reciente cuyo entrenamiento terminó antes de esa ventana.
pub fn span_driven_evaluator_inputs<S>(store: &S,
                                       examples: &[Artifact],
                                       models: &[Artifact],
                                       params: &SpanDrivenParams)
                                       -> Result<EvaluatorInputs, ResolveError>
    where S: MetadataStore + ?Sized
{
    let start = params.start_span_number;
    let Some(max_span) = examples.iter().filter_map(Artifact::span).filter(|s| *s >= start).max() else {
        return Ok(EvaluatorInputs::default());
    };
    let anchor = max_span - params.wait_spans_before_eval;
    let window_start = (anchor - params.additional_spans_per_eval).max(start);
    let in_window = examples.iter()
                            .filter(|a| a.span().is_some_and(|s| s >= window_start && s <= anchor))
                            .cloned()
                            .collect();
    let examples = dedupe_latest_version(in_window);

    let cutoff = anchor - params.additional_spans_per_eval - params.evaluation_training_offset;
    // Candidatos por entrenamiento más reciente; sin ejecución productora no
    // hay entrenamiento y el modelo nunca es elegible.
    let mut candidates = Vec::with_capacity(models.len());
    for candidate in models {
        if let Some(trainer) = latest_producer(store, candidate.id)? {
            candidates.push((trainer, candidate));
        }
    }
    candidates.sort_by_key(|(trainer, m)| std::cmp::Reverse((trainer.creation_key(), m.creation_key())));
    let mut model = Vec::new();
    for (trainer, candidate) in candidates {
        let trained_on = trainer_inputs(store, &trainer, EXAMPLES_TYPE)?;
        let last_span = trained_on.iter().filter_map(Artifact::span).max();
        if last_span.is_some_and(|s| s < cutoff) {
            debug!("span_driven model_id={} last_training_span={:?} cutoff={cutoff}",
                   candidate.id,
                   last_span);
            model.push(candidate.clone());
            break;
        }
    }
    debug!("span_driven anchor={anchor} window=[{window_start}, {anchor}] examples={} model={}",
           examples.len(),
           model.len());
    Ok(EvaluatorInputs { examples, model })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMetadataStore;

    fn train(store: &mut InMemoryMetadataStore, examples: &[Artifact]) -> Artifact {
        let model = store.put_artifact("Model", &[]);
        store.put_execution("Trainer",
                            &[("examples", examples.iter().map(|e| e.id).collect::<Vec<_>>())],
                            &[("model", vec![model.id])],
                            &[]);
        model
    }

    #[test]
    fn training_range_follows_latest_model() {
        let mut store = InMemoryMetadataStore::new();
        let examples: Vec<Artifact> = (0..4).map(|s| store.put_spanned("Examples", s, 0)).collect();
        let model = train(&mut store, &examples[1..4]);
        let out = training_range(&store, &[model], EXAMPLES_TYPE).unwrap();
        assert_eq!(out.iter().map(|a| a.span().unwrap()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn training_range_without_producer_is_empty() {
        let mut store = InMemoryMetadataStore::new();
        let model = store.put_artifact("Model", &[]);
        assert!(training_range(&store, &[model], EXAMPLES_TYPE).unwrap().is_empty());
        assert!(training_range(&store, &[], EXAMPLES_TYPE).unwrap().is_empty());
    }

    #[test]
    fn latest_trained_picks_latest_execution() {
        let mut store = InMemoryMetadataStore::new();
        let models: Vec<Artifact> = (0..3).map(|_| train(&mut store, &[])).collect();
        let out = latest_trained(&store, &models).unwrap();
        assert_eq!(out, vec![models[2].clone()]);
    }

    #[test]
    fn latest_trained_ignores_outputs_outside_input() {
        let mut store = InMemoryMetadataStore::new();
        let a = store.put_artifact("Model", &[]);
        let b = store.put_artifact("Model", &[]);
        store.put_execution("Trainer", &[], &[("model", vec![a.id, b.id])], &[]);
        assert_eq!(latest_trained(&store, &[a.clone()]).unwrap(), vec![a]);
    }

    #[test]
    fn span_driven_selects_window_and_model() {
        let mut store = InMemoryMetadataStore::new();
        let examples: Vec<Artifact> = (1..=10).map(|s| store.put_spanned("Examples", s, 0)).collect();
        let models: Vec<Artifact> = (0..5).map(|i| train(&mut store, &examples[i..i + 3])).collect();
        let params = SpanDrivenParams { wait_spans_before_eval: 1,
                                        evaluation_training_offset: 2,
                                        additional_spans_per_eval: 3,
                                        start_span_number: 1 };
        let out = span_driven_evaluator_inputs(&store, &examples, &models, &params).unwrap();
        assert_eq!(out.model, vec![models[0].clone()]);
        assert_eq!(out.examples, examples[5..9].to_vec());
    }

    #[test]
    fn span_driven_prefers_most_recently_trained_model() {
        let mut store = InMemoryMetadataStore::new();
        let examples: Vec<Artifact> = (1..=10).map(|s| store.put_spanned("Examples", s, 0)).collect();
        let older = store.put_artifact("Model", &[]);
        let newer = store.put_artifact("Model", &[]);
        for model in [&newer, &older] {
            store.put_execution("Trainer",
                                &[("examples", vec![examples[0].id, examples[1].id])],
                                &[("model", vec![model.id])],
                                &[]);
        }
        let params = SpanDrivenParams { start_span_number: 1,
                                        ..SpanDrivenParams::default() };
        let models = vec![older.clone(), newer];
        let out = span_driven_evaluator_inputs(&store, &examples, &models, &params).unwrap();
        assert_eq!(out.model, vec![older]);
    }

    #[test]
    fn pipeline_run_outputs_come_from_latest_run() {
        let mut store = InMemoryMetadataStore::new();
        let ctx = store.put_context("pipeline", "producer-pipeline");
        let other = store.put_context("pipeline", "other");
        let first = store.put_artifact("DummyArtifact", &[]);
        let second = store.put_artifact("DummyArtifact", &[]);
        let foreign = store.put_artifact("DummyArtifact", &[]);
        store.put_execution("Producer", &[], &[("x", vec![first.id])], &[ctx.id]);
        store.put_execution("Producer", &[], &[("x", vec![second.id])], &[ctx.id]);
        store.put_execution("Producer", &[], &[("x", vec![foreign.id])], &[other.id]);
        store.put_execution("Pusher", &[("x", vec![second.id])], &[("y", vec![])], &[ctx.id]);

        let out = latest_pipeline_run_outputs(&store, "producer-pipeline", "x").unwrap();
        assert_eq!(out, vec![second]);
        assert!(latest_pipeline_run_outputs(&store, "producer-pipeline", "y").unwrap().is_empty());
        assert!(latest_pipeline_run_outputs(&store, "missing", "x").unwrap().is_empty());
    }

    #[test]
    fn span_driven_without_examples_is_empty() {
        let store = InMemoryMetadataStore::new();
        let out = span_driven_evaluator_inputs(&store, &[], &[], &SpanDrivenParams::default()).unwrap();
        assert_eq!(out, EvaluatorInputs::default());
        assert_eq!(out.into_dict().keys().collect::<Vec<_>>(), vec!["examples", "model"]);
    }
}
