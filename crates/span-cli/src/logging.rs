use tracing_subscriber::EnvFilter;

/// Instala el subscriber `fmt` (a stderr) con el filtro dado; los registros
/// del facade `log` se redirigen a través de él.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}
