//! Subcomandos `resolve`, `validate` y `fingerprint`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use span_core::{InMemoryMetadataStore, ResolutionContext, Resolver};
use uuid::Uuid;

use crate::config::CliConfig;
use crate::errors::{CliError, EXIT_SKIP};

#[derive(Parser, Debug)]
#[command(name = "spanflow", about = "Resolve span/version windowed artifact selections from a metadata snapshot")]
#[command(after_help = r#"Environment variables (flags take precedence):
  SPANFLOW_LOG            log filter (default: info)
  SPANFLOW_SNAPSHOT       snapshot file used when --snapshot is omitted
  SPANFLOW_SHUFFLE_SEED   default seed for shuffle nodes without their own seed

Exit codes: 0 trigger/valid, 3 skip, 2 usage/config/IO error, 4 resolution error"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pretty-print the JSON output
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a context against a snapshot and print the outcome
    Resolve {
        /// Metadata snapshot (JSON). Falls back to SPANFLOW_SNAPSHOT.
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,
        /// Resolution context: operator graph plus slot bindings (JSON)
        #[arg(long, value_name = "FILE")]
        inputs: PathBuf,
        /// Default shuffle seed. Overrides SPANFLOW_SHUFFLE_SEED.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a resolution context without touching a snapshot
    Validate {
        #[arg(long, value_name = "FILE")]
        inputs: PathBuf,
    },
    /// Print the graph and context fingerprints
    Fingerprint {
        #[arg(long, value_name = "FILE")]
        inputs: PathBuf,
    },
}

/// Resultado de un subcomando: salida JSON y código de salida.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub exit_code: i32,
    pub output: Value,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(),
                                                                        source })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json { path: path.to_path_buf(),
                                                                  source })
}

fn load_context(path: &Path) -> Result<ResolutionContext, CliError> {
    let context: ResolutionContext = read_json(path)?;
    context.validate()?;
    Ok(context)
}

pub fn run(cli: &Cli, config: &CliConfig) -> Result<Report, CliError> {
    match &cli.command {
        Command::Resolve { snapshot, inputs, seed } => {
            let snapshot = snapshot.clone()
                                   .or_else(|| config.snapshot.clone())
                                   .ok_or_else(|| {
                                       CliError::Config("no snapshot given (--snapshot or SPANFLOW_SNAPSHOT)".into())
                                   })?;
            resolve(&snapshot, inputs, seed.or(config.shuffle_seed))
        }
        Command::Validate { inputs } => validate(inputs),
        Command::Fingerprint { inputs } => fingerprint(inputs),
    }
}

fn resolve(snapshot: &Path, inputs: &Path, seed: Option<u64>) -> Result<Report, CliError> {
    let run_id = Uuid::new_v4();
    let store: InMemoryMetadataStore = read_json(snapshot)?;
    let context = load_context(inputs)?;
    info!("resolve run_id={run_id} artifacts={} slots={} seed={seed:?}",
          store.artifacts().len(),
          context.slots().len());
    let outcome = Resolver::new(&store).with_shuffle_seed(seed).resolve(&context)?;
    let exit_code = if outcome.is_skip() { EXIT_SKIP } else { 0 };
    Ok(Report { exit_code,
                output: json!({
                    "run_id": run_id,
                    "context_fingerprint": context.fingerprint(),
                    "result": outcome,
                }) })
}

fn validate(inputs: &Path) -> Result<Report, CliError> {
    let context = load_context(inputs)?;
    let slots: Vec<Value> = context.slots()
                                   .iter()
                                   .map(|(name, binding)| {
                                       let node = context.graph().node(binding.node);
                                       json!({
                                           "slot": name,
                                           "node": binding.node,
                                           "operation": node.map(|n| n.operation_name()),
                                           "shape": node.map(|n| n.output_shape),
                                           "min_count": binding.min_count,
                                       })
                                   })
                                   .collect();
    Ok(Report { exit_code: 0,
                output: json!({ "valid": true, "nodes": context.graph().len(), "slots": slots }) })
}

fn fingerprint(inputs: &Path) -> Result<Report, CliError> {
    let context = load_context(inputs)?;
    Ok(Report { exit_code: 0,
                output: json!({
                    "graph": context.graph().fingerprint(),
                    "context": context.fingerprint(),
                }) })
}

/// Serializa la salida de un reporte.
pub fn render(report: &Report, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(&report.output)
    } else {
        serde_json::to_string(&report.output)
    };
    rendered.unwrap_or_else(|_| report.output.to_string())
}
