//! Digests blake3 usados por los fingerprints de grafos, contextos e invocaciones.

use serde_json::Value;

use super::to_canonical_json;

/// Digest blake3 en hex (64 caracteres).
pub fn hash_str(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

/// Digest de la forma canónica: independiente del orden de claves.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_matter() {
        let a = hash_value(&json!({"kind": "latest_created", "n": 2}));
        let b = hash_value(&json!({"n": 2, "kind": "latest_created"}));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn distinct_params_hash_differently() {
        assert_ne!(hash_value(&json!({"n": 1})), hash_value(&json!({"n": 2})));
    }
}
