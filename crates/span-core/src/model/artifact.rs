//! Artifact tal como lo expone el store de metadata.
//!
//! El core sólo lee snapshots: nunca modifica un `Artifact` devuelto por el
//! adaptador. Dos propiedades sostienen todos los algoritmos de ventana:
//! - `span`: coordenada temporal lógica (entera, no necesariamente contigua).
//! - `version`: revisión dentro de un span (entera, creciente). Si falta se
//!   interpreta como `0`.
//!
//! El "orden de creación" es `(create_time, id)` ascendente y es el único
//! reloj usado para decidir qué es "lo último".

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PropertyValue;
use crate::constants::{SPAN_PROPERTY, VERSION_PROPERTY};

pub type ArtifactId = i64;

/// Estado de ciclo de vida del artifact en el store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactState {
    Unknown,
    Pending,
    #[default]
    Live,
    MarkedForDeletion,
    Deleted,
    Abandoned,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub type_name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub state: ArtifactState,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    pub create_time: DateTime<Utc>,
}

impl Artifact {
    pub fn new(id: ArtifactId, type_name: impl Into<String>, create_time: DateTime<Utc>) -> Self {
        Self { id,
               type_name: type_name.into(),
               uri: String::new(),
               state: ArtifactState::Live,
               properties: BTreeMap::new(),
               create_time }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_span(self, span: i64) -> Self {
        self.with_property(SPAN_PROPERTY, span)
    }

    pub fn with_version(self, version: i64) -> Self {
        self.with_property(VERSION_PROPERTY, version)
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_state(mut self, state: ArtifactState) -> Self {
        self.state = state;
        self
    }

    pub fn int_property(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(PropertyValue::as_int)
    }

    /// Span del artifact; `None` si no tiene una propiedad `span` entera.
    pub fn span(&self) -> Option<i64> {
        self.int_property(SPAN_PROPERTY)
    }

    pub fn version(&self) -> i64 {
        self.int_property(VERSION_PROPERTY).unwrap_or(0)
    }

    pub fn creation_key(&self) -> (DateTime<Utc>, ArtifactId) {
        (self.create_time, self.id)
    }

    /// Clave de orden por `(span, version, create_time, id)`.
    pub fn span_key(&self) -> Option<(i64, i64, DateTime<Utc>, ArtifactId)> {
        self.span().map(|s| (s, self.version(), self.create_time, self.id))
    }
}
