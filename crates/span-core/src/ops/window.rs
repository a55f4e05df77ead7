//! Algoritmos de ventana sobre `(span, version, create_time, id)`.
//!
//! Todas las funciones son puras: no consultan el store y no dependen del
//! orden de entrada.

use std::collections::BTreeSet;

use super::spans::{dedupe_latest_version, distinct_spans, finalize, sort_by_span, spanned};
use crate::graph::{RollingRangeParams, SequentialRollingRangeParams, StaticRangeParams};
use crate::model::Artifact;

/// Los `n` más recientes por orden de creación, devueltos en orden ascendente.
pub fn latest_created(artifacts: &[Artifact], n: usize) -> Vec<Artifact> {
    let mut sorted = artifacts.to_vec();
    sorted.sort_by_key(Artifact::creation_key);
    let skip = sorted.len().saturating_sub(n);
    sorted.split_off(skip)
}

/// Los `n` spans más altos, cada uno en su última versión.
pub fn latest_version(artifacts: &[Artifact], n: usize) -> Vec<Artifact> {
    let mut deduped = dedupe_latest_version(artifacts.to_vec());
    let skip = deduped.len().saturating_sub(n);
    deduped.split_off(skip)
}

pub fn all_spans(artifacts: &[Artifact]) -> Vec<Artifact> {
    dedupe_latest_version(artifacts.to_vec())
}

pub fn static_range(artifacts: &[Artifact], params: &StaticRangeParams) -> Vec<Artifact> {
    let excluded: BTreeSet<i64> = params.exclude_span_numbers.iter().copied().collect();
    let start = params.start_span.unwrap_or(i64::MIN);
    let kept = artifacts.iter()
                        .filter(|a| {
                            a.span()
                             .is_some_and(|s| s >= start && s <= params.end_span && !excluded.contains(&s))
                        })
                        .cloned()
                        .collect();
    finalize(kept, params.keep_all_versions)
}

/// Spans candidatos `>= start`, sin los `skip` más recientes.
fn candidate_spans(artifacts: &[Artifact], start_span: i64, skip_num_recent_spans: usize) -> Vec<i64> {
    let mut spans: Vec<i64> = distinct_spans(artifacts).into_iter().filter(|s| *s >= start_span).collect();
    spans.truncate(spans.len().saturating_sub(skip_num_recent_spans));
    spans
}

fn within(artifacts: &[Artifact], spans: &[i64], keep_all_versions: bool) -> Vec<Artifact> {
    let kept = artifacts.iter()
                        .filter(|a| a.span().is_some_and(|s| spans.contains(&s)))
                        .cloned()
                        .collect();
    finalize(kept, keep_all_versions)
}

/// Los `num_spans` spans más tempranos tras descartar los recientes; vacío si
/// no hay suficientes.
pub fn rolling_range(artifacts: &[Artifact], params: &RollingRangeParams) -> Vec<Artifact> {
    let spans = candidate_spans(artifacts, params.start_span, params.skip_num_recent_spans);
    if spans.len() < params.num_spans {
        return Vec::new();
    }
    within(artifacts, &spans[..params.num_spans], params.keep_all_versions)
}

/// Una ventana de `num_spans` spans consecutivos (en la lista de spans
/// restantes) por cada posición de inicio factible.
pub fn sequential_rolling_range(artifacts: &[Artifact], params: &SequentialRollingRangeParams) -> Vec<Vec<Artifact>> {
    let mut spans = candidate_spans(artifacts, params.start_span, params.skip_num_recent_spans);
    spans.retain(|s| !params.exclude_span_numbers.contains(s));
    if params.num_spans == 0 {
        return Vec::new();
    }
    spans.windows(params.num_spans)
         .map(|window| within(artifacts, window, params.keep_all_versions))
         .collect()
}

/// Ordena por span descartando artifacts sin span.
pub fn span_sorted(artifacts: &[Artifact]) -> Vec<Artifact> {
    sort_by_span(spanned(artifacts))
}
