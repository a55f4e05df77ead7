//! Consulta declarativa de artifacts: `{type, property filters}`.

use serde::{Deserialize, Serialize};

use super::{Artifact, ArtifactState, PropertyValue};
use crate::hashing::to_canonical_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub property: String,
    pub op: FilterOp,
    pub value: PropertyValue,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, op: FilterOp, value: impl Into<PropertyValue>) -> Self {
        Self { property: property.into(),
               op,
               value: value.into() }
    }

    /// Un artifact sin la propiedad, o con un valor no comparable, no cumple el filtro.
    pub fn matches(&self, artifact: &Artifact) -> bool {
        let Some(actual) = artifact.properties.get(&self.property) else {
            return false;
        };
        let Some(ord) = actual.compare(&self.value) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => ord.is_eq(),
            FilterOp::Ne => ord.is_ne(),
            FilterOp::Lt => ord.is_lt(),
            FilterOp::Le => ord.is_le(),
            FilterOp::Gt => ord.is_gt(),
            FilterOp::Ge => ord.is_ge(),
        }
    }
}

fn default_state() -> Option<ArtifactState> {
    Some(ArtifactState::Live)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactQuery {
    pub type_name: String,
    #[serde(default)]
    pub filters: Vec<PropertyFilter>,
    /// Estado requerido; por defecto sólo artifacts `LIVE`. `None` acepta cualquiera.
    #[serde(default = "default_state")]
    pub state: Option<ArtifactState>,
}

impl ArtifactQuery {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(),
               filters: Vec::new(),
               state: default_state() }
    }

    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn any_state(mut self) -> Self {
        self.state = None;
        self
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        artifact.type_name == self.type_name
        && self.state.map_or(true, |s| artifact.state == s)
        && self.filters.iter().all(|f| f.matches(artifact))
    }

    /// Clave estable para cachear resultados dentro de una resolución.
    pub fn cache_key(&self) -> String {
        match serde_json::to_value(self) {
            Ok(v) => to_canonical_json(&v),
            Err(_) => format!("{self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn artifact(span: i64) -> Artifact {
        Artifact::new(1, "Examples", Utc::now()).with_span(span)
    }

    #[test]
    fn filters_compare_property_values() {
        let q = ArtifactQuery::of_type("Examples").with_filter(PropertyFilter::new("span", FilterOp::Ge, 3));
        assert!(q.matches(&artifact(3)));
        assert!(!q.matches(&artifact(2)));
    }

    #[test]
    fn default_query_excludes_non_live_artifacts() {
        let a = artifact(1).with_state(ArtifactState::Deleted);
        assert!(!ArtifactQuery::of_type("Examples").matches(&a));
        assert!(ArtifactQuery::of_type("Examples").any_state().matches(&a));
    }

    #[test]
    fn missing_property_never_matches() {
        let q = ArtifactQuery::of_type("Examples").with_filter(PropertyFilter::new("split", FilterOp::Ne, "eval"));
        assert!(!q.matches(&artifact(1)));
    }

    #[test]
    fn cache_key_is_independent_of_construction_path() {
        let a = ArtifactQuery::of_type("Model");
        let b: ArtifactQuery = serde_json::from_str(r#"{"type_name":"Model"}"#).unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
