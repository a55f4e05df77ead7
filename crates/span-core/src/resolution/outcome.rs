//! Resultado tipado de una resolución: Trigger, TriggerSequence o Skip.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Invocation;
use crate::graph::NodeId;
use crate::model::Artifact;

/// Motivo por el que el paso no debe ejecutarse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientSpans { node: NodeId, found: usize, required: usize },
    MissingRequiredSpan { node: NodeId, span: i64 },
    EmptyResult { node: NodeId },
    RequiredSlotEmpty { slot: String },
    NoSelections,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientSpans { node, found, required } => {
                write!(f, "node {node} found {found} span(s), {required} required")
            }
            SkipReason::MissingRequiredSpan { node, span } => write!(f, "node {node} is missing required span {span}"),
            SkipReason::EmptyResult { node } => write!(f, "node {node} resolved no artifacts"),
            SkipReason::RequiredSlotEmpty { slot } => write!(f, "required slot '{slot}' is empty"),
            SkipReason::NoSelections => write!(f, "resolution produced no selections"),
        }
    }
}

/// Artifacts elegidos por slot, en orden de consumo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSelection {
    pub artifacts: IndexMap<String, Vec<Artifact>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub invocations: IndexMap<String, Invocation>,
}

impl ResolvedSelection {
    pub fn get(&self, slot: &str) -> Option<&[Artifact]> {
        self.artifacts.get(slot).map(Vec::as_slice)
    }

    pub fn ids(&self, slot: &str) -> Vec<i64> {
        self.get(slot).map(|arts| arts.iter().map(|a| a.id).collect()).unwrap_or_default()
    }

    pub fn invocation(&self, slot: &str) -> Option<&Invocation> {
        self.invocations.get(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// Una única ejecución del paso.
    Trigger { selection: ResolvedSelection },
    /// Una ejecución por elemento, en orden.
    TriggerSequence { selections: Vec<ResolvedSelection> },
    Skip { reason: SkipReason },
}

impl ResolveOutcome {
    pub fn skip(reason: SkipReason) -> Self {
        ResolveOutcome::Skip { reason }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, ResolveOutcome::Skip { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            ResolveOutcome::Skip { reason } => Some(reason),
            _ => None,
        }
    }

    /// Selecciones a ejecutar (vacío si es Skip).
    pub fn selections(&self) -> &[ResolvedSelection] {
        match self {
            ResolveOutcome::Trigger { selection } => std::slice::from_ref(selection),
            ResolveOutcome::TriggerSequence { selections } => selections,
            ResolveOutcome::Skip { .. } => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResolveOutcome::Trigger { .. } => "trigger",
            ResolveOutcome::TriggerSequence { .. } => "trigger_sequence",
            ResolveOutcome::Skip { .. } => "skip",
        }
    }
}
