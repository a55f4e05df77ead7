//! Utilidades de orden y deduplicación por span.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Artifact;

/// Artifacts con propiedad `span` entera; el resto se ignora.
pub fn spanned(artifacts: &[Artifact]) -> Vec<Artifact> {
    artifacts.iter().filter(|a| a.span().is_some()).cloned().collect()
}

/// Orden ascendente por `(span, version, create_time, id)`.
pub fn sort_by_span(mut artifacts: Vec<Artifact>) -> Vec<Artifact> {
    artifacts.sort_by_key(Artifact::span_key);
    artifacts
}

/// Un registro por span: la versión máxima, desempatando por el más
/// reciente en orden de creación. Resultado ascendente por span.
pub fn dedupe_latest_version(artifacts: Vec<Artifact>) -> Vec<Artifact> {
    let mut latest: BTreeMap<i64, Artifact> = BTreeMap::new();
    for artifact in artifacts {
        let Some(span) = artifact.span() else { continue };
        match latest.get(&span) {
            Some(current) if current.span_key() >= artifact.span_key() => {}
            _ => {
                latest.insert(span, artifact);
            }
        }
    }
    latest.into_values().collect()
}

/// `dedupe_latest_version` salvo que se pidan todas las versiones.
pub fn finalize(artifacts: Vec<Artifact>, keep_all_versions: bool) -> Vec<Artifact> {
    if keep_all_versions {
        sort_by_span(artifacts)
    } else {
        dedupe_latest_version(artifacts)
    }
}

pub fn distinct_spans(artifacts: &[Artifact]) -> Vec<i64> {
    artifacts.iter()
             .filter_map(Artifact::span)
             .collect::<BTreeSet<_>>()
             .into_iter()
             .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn dedupe_keeps_max_version_then_latest_created() {
        let a = Artifact::new(1, "E", at(10)).with_span(0).with_version(1);
        let b = Artifact::new(2, "E", at(20)).with_span(0).with_version(1);
        let c = Artifact::new(3, "E", at(30)).with_span(0).with_version(0);
        let d = Artifact::new(4, "E", at(5)).with_span(1);
        let out = dedupe_latest_version(vec![c, b, a, d]);
        assert_eq!(out.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn unspanned_artifacts_are_dropped() {
        let a = Artifact::new(1, "E", at(1));
        let b = Artifact::new(2, "E", at(2)).with_span(3);
        assert_eq!(spanned(&[a.clone(), b.clone()]), vec![b.clone()]);
        assert_eq!(distinct_spans(&[a, b]), vec![3]);
    }
}
