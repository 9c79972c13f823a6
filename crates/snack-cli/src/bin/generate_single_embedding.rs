//! generate-single-embedding
//!
//! Prints the embedding of one text as a bare JSON array of floats. Every
//! failure is reported as `{"error": ...}` on stderr with exit code 1, and
//! stdout stays empty. The first argument is the text even when it looks
//! like a flag; settings flags are only read in `--config=PATH` form.

use std::io;
use std::process::ExitCode;

use anyhow::Result;

use snack_cli::{
    candle_loader, init_logging, load_settings, parse_payload, report_json_error,
    run_single_embedding, SingleEmbeddingCli,
};

fn main() -> ExitCode {
    let cli: SingleEmbeddingCli = parse_payload();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_json_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: SingleEmbeddingCli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    run_single_embedding(
        cli.text.as_deref(),
        candle_loader(&settings.embedding),
        &mut io::stdout(),
    )
}
