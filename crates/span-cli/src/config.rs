//! Configuración del binario.
//! Carga `.env` una sola vez y lee las variables `SPANFLOW_*`; los flags de
//! la línea de comandos tienen prioridad sobre el entorno.
use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::errors::CliError;

/// Ruta del `.env` cargado, si había uno.
static DOTENV: Lazy<Option<PathBuf>> = Lazy::new(|| dotenvy::dotenv().ok());

pub const LOG_ENV: &str = "SPANFLOW_LOG";
pub const SNAPSHOT_ENV: &str = "SPANFLOW_SNAPSHOT";
pub const SHUFFLE_SEED_ENV: &str = "SPANFLOW_SHUFFLE_SEED";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Filtro de logging (sintaxis `EnvFilter`).
    pub log_filter: String,
    /// Snapshot por defecto cuando no se pasa `--snapshot`.
    pub snapshot: Option<PathBuf>,
    /// Semilla por defecto para nodos `shuffle` sin semilla propia.
    pub shuffle_seed: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { log_filter: DEFAULT_LOG_FILTER.to_string(),
               snapshot: None,
               shuffle_seed: None }
    }
}

impl CliConfig {
    /// Construye la configuración a partir de una función de búsqueda de variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let shuffle_seed = match lookup(SHUFFLE_SEED_ENV) {
            Some(raw) => Some(raw.trim()
                                 .parse::<u64>()
                                 .map_err(|e| CliError::Config(format!("{SHUFFLE_SEED_ENV}={raw:?}: {e}")))?),
            None => None,
        };
        Ok(Self { log_filter: lookup(LOG_ENV).filter(|v| !v.trim().is_empty())
                                             .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                  snapshot: lookup(SNAPSHOT_ENV).filter(|v| !v.trim().is_empty()).map(PathBuf::from),
                  shuffle_seed })
    }
}

/// Carga `.env` (una vez por proceso) y lee el entorno.
pub fn load() -> Result<CliConfig, CliError> {
    Lazy::force(&DOTENV);
    CliConfig::from_lookup(|key| env::var(key).ok())
}
