//! recommend-snacks
//!
//! Reads the embeddings document and prints
//! `{"recommendations": [{name, emoji, category, score}, ...]}`.

use std::io;
use std::process::ExitCode;

use anyhow::Result;

use snack_cli::{
    init_logging, load_settings, parse_or_report, report_json_error, run_recommend, RecommendCli,
};

fn main() -> ExitCode {
    let cli = match parse_or_report::<RecommendCli>(true) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_json_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: RecommendCli) -> Result<usize> {
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    let document_path = cli.embeddings.unwrap_or_else(|| settings.output_path());
    run_recommend(
        &document_path,
        &cli.snack_name,
        &settings.recommendation,
        &mut io::stdout(),
    )
}
