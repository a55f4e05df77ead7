//! Algoritmos de resolución (funciones puras salvo las de linaje).

mod lineage;
mod shuffle;
mod skip;
pub mod spans;
mod window;

pub use lineage::{latest_pipeline_run_outputs, latest_trained, span_driven_evaluator_inputs, training_range,
                  EvaluatorInputs};
pub use shuffle::shuffle;
pub use skip::insufficient_spans;
pub use window::{all_spans, latest_created, latest_version, rolling_range, sequential_rolling_range, span_sorted,
                 static_range};
