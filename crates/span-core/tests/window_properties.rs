use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use span_core::graph::{RollingRangeParams, SequentialRollingRangeParams, StaticRangeParams};
use span_core::ops;
use span_core::Artifact;

fn corpus(pairs: &[(i64, i64)]) -> Vec<Artifact> {
    pairs.iter()
         .enumerate()
         .map(|(i, (span, version))| {
             let at = DateTime::<Utc>::from_timestamp(1_700_000_000 + i as i64, 0).unwrap();
             Artifact::new(i as i64 + 1, "Examples", at).with_span(*span).with_version(*version)
         })
         .collect()
}

fn pairs() -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((0i64..20, 0i64..4), 0..40)
}

fn ids(artifacts: &[Artifact]) -> Vec<i64> {
    artifacts.iter().map(|a| a.id).collect()
}

proptest! {
    #[test]
    fn all_spans_keeps_one_max_version_per_span(pairs in pairs()) {
        let arts = corpus(&pairs);
        let out = ops::all_spans(&arts);
        let mut max_version: BTreeMap<i64, i64> = BTreeMap::new();
        for (span, version) in &pairs {
            let entry = max_version.entry(*span).or_insert(*version);
            *entry = (*entry).max(*version);
        }
        let got: Vec<(i64, i64)> = out.iter().map(|a| (a.span().unwrap(), a.version())).collect();
        let expected: Vec<(i64, i64)> = max_version.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn rolling_range_ignores_input_order(pairs in pairs(),
                                         start in 0i64..10,
                                         num in 1usize..5,
                                         skip in 0usize..3,
                                         keep_all in any::<bool>()) {
        let arts = corpus(&pairs);
        let mut reversed = arts.clone();
        reversed.reverse();
        let params = RollingRangeParams { start_span: start,
                                          num_spans: num,
                                          skip_num_recent_spans: skip,
                                          keep_all_versions: keep_all };
        prop_assert_eq!(ids(&ops::rolling_range(&arts, &params)), ids(&ops::rolling_range(&reversed, &params)));
    }

    #[test]
    fn static_range_stays_inside_bounds(pairs in pairs(),
                                        start in 0i64..10,
                                        width in 0i64..10,
                                        excluded in proptest::collection::vec(0i64..20, 0..4)) {
        let arts = corpus(&pairs);
        let params = StaticRangeParams { start_span: Some(start),
                                         end_span: start + width,
                                         keep_all_versions: true,
                                         exclude_span_numbers: excluded.clone() };
        for artifact in ops::static_range(&arts, &params) {
            let span = artifact.span().unwrap();
            prop_assert!(span >= start && span <= start + width);
            prop_assert!(!excluded.contains(&span));
        }
    }

    #[test]
    fn sequential_windows_advance_by_one(pairs in pairs(), num in 1usize..5) {
        let arts = corpus(&pairs);
        let params = SequentialRollingRangeParams { start_span: 0,
                                                    num_spans: num,
                                                    skip_num_recent_spans: 0,
                                                    keep_all_versions: false,
                                                    exclude_span_numbers: vec![] };
        let windows = ops::sequential_rolling_range(&arts, &params);
        let spans: Vec<i64> = pairs.iter().map(|(s, _)| *s).collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(windows.len(), (spans.len() + 1).saturating_sub(num));
        for (i, window) in windows.iter().enumerate() {
            let window_spans: Vec<i64> = window.iter().map(|a| a.span().unwrap()).collect();
            prop_assert_eq!(window_spans, spans[i..i + num].to_vec());
        }
    }

    #[test]
    fn sequential_windows_never_contain_excluded_spans(pairs in pairs(),
                                                      num in 1usize..4,
                                                      excluded in proptest::collection::vec(0i64..20, 0..6)) {
        let arts = corpus(&pairs);
        let params = SequentialRollingRangeParams { start_span: 0,
                                                    num_spans: num,
                                                    skip_num_recent_spans: 0,
                                                    keep_all_versions: false,
                                                    exclude_span_numbers: excluded.clone() };
        let windows = ops::sequential_rolling_range(&arts, &params);
        let remaining: Vec<i64> = pairs.iter()
                                       .map(|(s, _)| *s)
                                       .filter(|s| !excluded.contains(s))
                                       .collect::<BTreeSet<_>>()
                                       .into_iter()
                                       .collect();
        prop_assert_eq!(windows.len(), (remaining.len() + 1).saturating_sub(num));
        for (i, window) in windows.iter().enumerate() {
            let window_spans: Vec<i64> = window.iter().map(|a| a.span().unwrap()).collect();
            prop_assert_eq!(window_spans, remaining[i..i + num].to_vec());
        }
    }

    #[test]
    fn latest_n_returns_min_n_available(pairs in pairs(), n in 1usize..10) {
        let arts = corpus(&pairs);
        let created = ops::latest_created(&arts, n);
        prop_assert_eq!(created.len(), n.min(arts.len()));
        prop_assert!(created.windows(2).all(|w| w[0].creation_key() < w[1].creation_key()));

        let distinct = pairs.iter().map(|(s, _)| *s).collect::<BTreeSet<_>>().len();
        let versioned = ops::latest_version(&arts, n);
        prop_assert_eq!(versioned.len(), n.min(distinct));
        prop_assert!(versioned.windows(2).all(|w| w[0].span() < w[1].span()));
    }
}
