use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use phyloflow::{AppConfig, Cli, CoreError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Instala también el puente `log` → `tracing` usado por los crates del workspace.
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}

fn run(cli: &Cli) -> Result<(), CoreError> {
    let config = AppConfig::from_env()?.with_cli(cli)?;
    let report = phyloflow::run(&config)?;

    println!("mode: {:?}", config.mode);
    println!("records: {} (misses: {})", report.fetched.records.len(), report.fetched.misses.len());
    for miss in &report.fetched.misses {
        println!("  miss: {miss}");
    }
    println!("alignment: {} -> {}", report.alignment.method, report.alignment.handle);
    for file in &report.exported.files {
        println!("tree: {} -> {}", file.method, file.path.display());
    }
    println!("fingerprint: {}", report.flow_fingerprint);
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("phyloflow:failed err={e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
