use clap::Parser;
use log::error;
use span_cli::errors::EXIT_USAGE;
use span_cli::{commands, config, logging, Cli};

fn main() {
    let cli = Cli::parse();
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[spanflow] {e}");
            std::process::exit(EXIT_USAGE);
        }
    };
    logging::init(&config.log_filter);

    match commands::run(&cli, &config) {
        Ok(report) => {
            println!("{}", commands::render(&report, cli.pretty));
            std::process::exit(report.exit_code);
        }
        Err(e) => {
            error!("spanflow failed: {e}");
            eprintln!("[spanflow] {e}");
            std::process::exit(e.exit_code());
        }
    }
}
