//! Operaciones del grafo de resolución.
//!
//! Cada variante de `ResolverOp` es una operación canónica con sus
//! parámetros tipados. Los literales se validan al construir el nodo
//! (`ResolverOp::validate`), nunca durante la evaluación.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::EXAMPLES_TYPE;
use crate::errors::ResolveError;
use crate::model::ArtifactQuery;

/// Forma de la salida de un nodo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Una única lista de artifacts.
    List,
    /// Una secuencia de listas; cada elemento dirige una ejecución.
    ListOfLists,
    /// Listas indexadas por nombre de slot (resoluciones conjuntas).
    Dict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRangeParams {
    #[serde(default)]
    pub start_span: Option<i64>,
    pub end_span: i64,
    #[serde(default)]
    pub keep_all_versions: bool,
    #[serde(default)]
    pub exclude_span_numbers: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingRangeParams {
    pub start_span: i64,
    pub num_spans: usize,
    #[serde(default)]
    pub skip_num_recent_spans: usize,
    #[serde(default)]
    pub keep_all_versions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialRollingRangeParams {
    pub start_span: i64,
    pub num_spans: usize,
    #[serde(default)]
    pub skip_num_recent_spans: usize,
    #[serde(default)]
    pub keep_all_versions: bool,
    #[serde(default)]
    pub exclude_span_numbers: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanDrivenParams {
    #[serde(default)]
    pub wait_spans_before_eval: i64,
    #[serde(default)]
    pub evaluation_training_offset: i64,
    #[serde(default)]
    pub additional_spans_per_eval: i64,
    #[serde(default)]
    pub start_span_number: i64,
}

fn default_examples_type() -> String {
    EXAMPLES_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverOp {
    /// Hoja del grafo: artifacts que cumplen la consulta.
    Input { query: ArtifactQuery },
    /// Hoja del grafo: salidas `output_key` de la última ejecución del
    /// pipeline `pipeline_name`.
    LatestPipelineRunOutputs { pipeline_name: String, output_key: String },
    LatestCreated { n: usize },
    LatestVersion { n: usize },
    AllSpans,
    StaticRange(StaticRangeParams),
    RollingRange(RollingRangeParams),
    SequentialRollingRange(SequentialRollingRangeParams),
    Shuffle {
        #[serde(default)]
        seed: Option<u64>,
    },
    TrainingRange {
        #[serde(default = "default_examples_type")]
        examples_type: String,
    },
    LatestTrained,
    SpanDrivenEvaluatorInputs(SpanDrivenParams),
    /// Proyecta una clave de un resultado `Dict`.
    Select { key: String },
    /// Señal de Skip si hay menos de `min_spans` spans distintos o falta `required_span`.
    SkipIfInsufficientSpans {
        min_spans: usize,
        #[serde(default)]
        required_span: Option<i64>,
    },
    /// Señal de Skip si el resultado (lista o secuencia) está vacío.
    SkipIfEmpty,
}

fn non_negative(name: &str, value: i64) -> Result<(), ResolveError> {
    if value < 0 {
        return Err(ResolveError::InvalidArgument(format!("{name} must be >= 0, got {value}")));
    }
    Ok(())
}

fn positive(name: &str, value: usize) -> Result<(), ResolveError> {
    if value == 0 {
        return Err(ResolveError::InvalidArgument(format!("{name} must be > 0")));
    }
    Ok(())
}

impl ResolverOp {
    /// Identificador estable de la operación (snake_case).
    pub fn name(&self) -> &'static str {
        match self {
            ResolverOp::Input { .. } => "input",
            ResolverOp::LatestPipelineRunOutputs { .. } => "latest_pipeline_run_outputs",
            ResolverOp::LatestCreated { .. } => "latest_created",
            ResolverOp::LatestVersion { .. } => "latest_version",
            ResolverOp::AllSpans => "all_spans",
            ResolverOp::StaticRange(_) => "static_range",
            ResolverOp::RollingRange(_) => "rolling_range",
            ResolverOp::SequentialRollingRange(_) => "sequential_rolling_range",
            ResolverOp::Shuffle { .. } => "shuffle",
            ResolverOp::TrainingRange { .. } => "training_range",
            ResolverOp::LatestTrained => "latest_trained",
            ResolverOp::SpanDrivenEvaluatorInputs(_) => "span_driven_evaluator_inputs",
            ResolverOp::Select { .. } => "select",
            ResolverOp::SkipIfInsufficientSpans { .. } => "skip_if_insufficient_spans",
            ResolverOp::SkipIfEmpty => "skip_if_empty",
        }
    }

    /// Cantidad de nodos de entrada que consume la operación.
    pub fn arity(&self) -> usize {
        match self {
            ResolverOp::Input { .. } | ResolverOp::LatestPipelineRunOutputs { .. } => 0,
            ResolverOp::SpanDrivenEvaluatorInputs(_) => 2,
            _ => 1,
        }
    }

    /// Si la operación acepta una entrada con la forma dada.
    pub fn accepts(&self, shape: OutputShape) -> bool {
        match self {
            ResolverOp::Input { .. } | ResolverOp::LatestPipelineRunOutputs { .. } => false,
            ResolverOp::Select { .. } => shape == OutputShape::Dict,
            ResolverOp::SkipIfEmpty => shape != OutputShape::Dict,
            _ => shape == OutputShape::List,
        }
    }

    /// Forma de la salida dadas las formas de las entradas (ya aceptadas).
    pub fn output_shape(&self, inputs: &[OutputShape]) -> OutputShape {
        match self {
            ResolverOp::SequentialRollingRange(_) => OutputShape::ListOfLists,
            ResolverOp::SpanDrivenEvaluatorInputs(_) => OutputShape::Dict,
            ResolverOp::SkipIfEmpty => inputs.first().copied().unwrap_or(OutputShape::List),
            _ => OutputShape::List,
        }
    }

    /// Validación de literales al construir el nodo.
    pub fn validate(&self) -> Result<(), ResolveError> {
        match self {
            ResolverOp::Input { query } => {
                if query.type_name.trim().is_empty() {
                    return Err(ResolveError::InvalidArgument("artifact query requires a type name".into()));
                }
            }
            ResolverOp::LatestPipelineRunOutputs { pipeline_name, output_key } => {
                if pipeline_name.trim().is_empty() || output_key.trim().is_empty() {
                    return Err(ResolveError::InvalidArgument("latest_pipeline_run_outputs requires a pipeline name and an output key".into()));
                }
            }
            ResolverOp::LatestCreated { n } | ResolverOp::LatestVersion { n } => positive("n", *n)?,
            ResolverOp::StaticRange(p) => {
                non_negative("end_span", p.end_span)?;
                if let Some(start) = p.start_span {
                    non_negative("start_span", start)?;
                    if start > p.end_span {
                        return Err(ResolveError::InvalidArgument(format!("start_span ({start}) must be <= end_span ({})",
                                                                         p.end_span)));
                    }
                }
            }
            ResolverOp::RollingRange(p) => {
                non_negative("start_span", p.start_span)?;
                positive("num_spans", p.num_spans)?;
            }
            ResolverOp::SequentialRollingRange(p) => {
                non_negative("start_span", p.start_span)?;
                positive("num_spans", p.num_spans)?;
            }
            ResolverOp::TrainingRange { examples_type } => {
                if examples_type.trim().is_empty() {
                    return Err(ResolveError::InvalidArgument("examples_type must not be empty".into()));
                }
            }
            ResolverOp::SpanDrivenEvaluatorInputs(p) => {
                non_negative("wait_spans_before_eval", p.wait_spans_before_eval)?;
                non_negative("evaluation_training_offset", p.evaluation_training_offset)?;
                non_negative("additional_spans_per_eval", p.additional_spans_per_eval)?;
                non_negative("start_span_number", p.start_span_number)?;
            }
            ResolverOp::Select { key } => {
                if key.is_empty() {
                    return Err(ResolveError::InvalidArgument("select key must not be empty".into()));
                }
            }
            ResolverOp::SkipIfInsufficientSpans { required_span: Some(span), .. } => non_negative("required_span", *span)?,
            ResolverOp::AllSpans
            | ResolverOp::Shuffle { .. }
            | ResolverOp::LatestTrained
            | ResolverOp::SkipIfInsufficientSpans { .. }
            | ResolverOp::SkipIfEmpty => {}
        }
        Ok(())
    }

    /// Parámetros de la operación como mapa `nombre -> literal`.
    pub fn kwargs(&self) -> IndexMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().filter(|(k, _)| k != "kind").collect(),
            _ => IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_n_is_rejected() {
        let err = ResolverOp::LatestCreated { n: 0 }.validate().unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(ref m) if m.contains("n must be > 0")));
    }

    #[test]
    fn static_range_bounds_are_checked() {
        let op = ResolverOp::StaticRange(StaticRangeParams { start_span: Some(6),
                                                             end_span: 5,
                                                             keep_all_versions: false,
                                                             exclude_span_numbers: vec![] });
        assert!(op.validate().is_err());
    }

    #[test]
    fn kwargs_expose_typed_params() {
        let op = ResolverOp::RollingRange(RollingRangeParams { start_span: 3,
                                                               num_spans: 2,
                                                               skip_num_recent_spans: 1,
                                                               keep_all_versions: true });
        let kw = op.kwargs();
        assert_eq!(kw.get("num_spans"), Some(&Value::from(2)));
        assert!(!kw.contains_key("kind"));
    }

    #[test]
    fn serde_tag_matches_name() {
        let op = ResolverOp::SkipIfEmpty;
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["kind"], Value::from(op.name()));
        let back: ResolverOp = serde_json::from_value(serde_json::json!({"kind": "training_range"})).unwrap();
        assert_eq!(back, ResolverOp::TrainingRange { examples_type: "Examples".into() });
    }

    #[test]
    fn pipeline_run_outputs_is_a_leaf_with_names() {
        let op = ResolverOp::LatestPipelineRunOutputs { pipeline_name: "producer-pipeline".into(),
                                                        output_key: "x".into() };
        assert_eq!(op.arity(), 0);
        assert_eq!(op.kwargs().get("pipeline_name"), Some(&Value::from("producer-pipeline")));
        let blank = ResolverOp::LatestPipelineRunOutputs { pipeline_name: " ".into(),
                                                           output_key: "x".into() };
        assert!(matches!(blank.validate(), Err(ResolveError::InvalidArgument(_))));
    }
}
