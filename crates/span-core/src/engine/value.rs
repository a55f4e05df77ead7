use indexmap::IndexMap;

use crate::graph::OutputShape;
use crate::model::Artifact;

/// Valor materializado de un nodo durante una resolución.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    List(Vec<Artifact>),
    ListOfLists(Vec<Vec<Artifact>>),
    Dict(IndexMap<String, Vec<Artifact>>),
}

impl NodeValue {
    pub fn shape(&self) -> OutputShape {
        match self {
            NodeValue::List(_) => OutputShape::List,
            NodeValue::ListOfLists(_) => OutputShape::ListOfLists,
            NodeValue::Dict(_) => OutputShape::Dict,
        }
    }

    /// Artifacts en una lista, elementos en una secuencia, claves en un dict.
    pub fn len(&self) -> usize {
        match self {
            NodeValue::List(list) => list.len(),
            NodeValue::ListOfLists(seq) => seq.len(),
            NodeValue::Dict(dict) => dict.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NodeValue::Dict(dict) => dict.values().all(Vec::is_empty),
            _ => self.len() == 0,
        }
    }
}
