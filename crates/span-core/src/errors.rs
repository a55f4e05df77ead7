//! Errores del core de resolución.
//!
//! `ResolveError` cubre los fallos estructurales (argumentos inválidos,
//! grafos mal formados, formas de resultado inconsistentes). La ausencia de
//! datos nunca es un error: se expresa como `ResolveOutcome::Skip`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ResolveError {
    /// Parámetro literal mal formado al construir un nodo (p.ej. `n == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Slots que producen secuencias de distinta longitud en una misma resolución.
    #[error("inconsistent result shape: {0}")]
    InconsistentResultShape(String),
    /// Propagado sin cambios desde el adaptador del store (sin reintentos).
    #[error("metadata store unavailable: {0}")]
    StoreUnavailable(String),
    /// Referencias colgantes, nodos fuera de orden o bindings inválidos.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Errores expuestos por un adaptador de metadata (`MetadataStore`).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => Self::Internal(format!("corrupt store record: {msg}")),
        }
    }
}
