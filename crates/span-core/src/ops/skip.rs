//! Comprobaciones que elevan una señal de Skip explícita.

use super::spans::distinct_spans;
use crate::graph::NodeId;
use crate::model::Artifact;
use crate::resolution::SkipReason;

pub fn insufficient_spans(node: NodeId,
                          artifacts: &[Artifact],
                          min_spans: usize,
                          required_span: Option<i64>)
                          -> Option<SkipReason> {
    let spans = distinct_spans(artifacts);
    if let Some(span) = required_span {
        if !spans.contains(&span) {
            return Some(SkipReason::MissingRequiredSpan { node, span });
        }
    }
    (spans.len() < min_spans).then_some(SkipReason::InsufficientSpans { node,
                                                                       found: spans.len(),
                                                                       required: min_spans })
}
