//! Ejecuciones y contextos: las aristas de linaje que consulta el core.
//!
//! Una `Execution` enlaza una instancia de operación con los artifacts que
//! consumió (`inputs`) y produjo (`outputs`), agrupados por clave de evento.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ArtifactId;

pub type ExecutionId = i64;
pub type ContextId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub type_name: String,
    pub create_time: DateTime<Utc>,
    #[serde(default)]
    pub inputs: IndexMap<String, Vec<ArtifactId>>,
    #[serde(default)]
    pub outputs: IndexMap<String, Vec<ArtifactId>>,
    #[serde(default)]
    pub contexts: Vec<ContextId>,
}

impl Execution {
    pub fn input_ids(&self) -> impl Iterator<Item = ArtifactId> + '_ {
        self.inputs.values().flatten().copied()
    }

    pub fn output_ids(&self) -> impl Iterator<Item = ArtifactId> + '_ {
        self.outputs.values().flatten().copied()
    }

    pub fn produced(&self, artifact: ArtifactId) -> bool {
        self.output_ids().any(|id| id == artifact)
    }

    pub fn consumed(&self, artifact: ArtifactId) -> bool {
        self.input_ids().any(|id| id == artifact)
    }

    pub fn creation_key(&self) -> (DateTime<Utc>, ExecutionId) {
        (self.create_time, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub type_name: String,
    pub name: String,
}

/// Punto de partida de una consulta de linaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageAnchor {
    Artifact(ArtifactId),
    Context(ContextId),
}
