//! Valores de propiedad de un artifact (`int | string | double`).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Double(f64),
    Str(String),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Orden parcial entre valores: numéricos entre sí (int y double se
    /// comparan como `f64`), strings lexicográficamente. Tipos mezclados no
    /// son comparables.
    pub fn compare(&self, other: &PropertyValue) -> Option<Ordering> {
        match (self, other) {
            (PropertyValue::Int(a), PropertyValue::Int(b)) => Some(a.cmp(b)),
            (PropertyValue::Str(a), PropertyValue::Str(b)) => Some(a.cmp(b)),
            (PropertyValue::Int(a), PropertyValue::Double(b)) => (*a as f64).partial_cmp(b),
            (PropertyValue::Double(a), PropertyValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (PropertyValue::Double(a), PropertyValue::Double(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_picks_the_narrowest_variant() {
        let v: Vec<PropertyValue> = serde_json::from_str(r#"[3, 3.5, "x"]"#).unwrap();
        assert_eq!(v, vec![PropertyValue::Int(3), PropertyValue::Double(3.5), PropertyValue::Str("x".into())]);
    }

    #[test]
    fn mixed_numeric_comparison() {
        assert_eq!(PropertyValue::Int(2).compare(&PropertyValue::Double(2.5)), Some(Ordering::Less));
        assert_eq!(PropertyValue::Str("a".into()).compare(&PropertyValue::Int(1)), None);
    }
}
