//! generate-embeddings
//!
//! Embeds every catalog description and writes the name -> record document
//! (default `snack_embeddings.json`). Progress goes to stderr; any failure
//! exits 1 without touching an existing document.

use std::io;
use std::process::ExitCode;

use anyhow::Result;

use snack_cli::{
    candle_loader, init_logging, load_catalog, load_settings, parse_or_report, run_batch,
    BatchCli,
};

fn main() -> ExitCode {
    let cli = match parse_or_report::<BatchCli>(false) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error generating embeddings: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: BatchCli) -> Result<usize> {
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    let catalog = load_catalog(&settings, cli.catalog.as_deref())?;
    let output = cli.output.unwrap_or_else(|| settings.output_path());

    run_batch(
        &catalog,
        candle_loader(&settings.embedding),
        &output,
        &mut io::stderr(),
    )
}
