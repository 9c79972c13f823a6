//! generate-description
//!
//! Prints a one-sentence description of a Nepali snack as a JSON string.
//!
//! ```bash
//! generate-description "Buff Momo"
//! generate-description --config=snacks.toml Momo
//! ```
//!
//! The first argument is the snack name even when it looks like a flag.
//! Model and settings failures fall back to a templated sentence and still
//! exit 0. Only an HTTP client that cannot be built exits 1, with
//! `{"error": ...}` on stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use snack_cli::{
    build_generator, init_logging, load_settings, parse_payload, report_json_error,
    run_describe, run_describe_fallback, DescribeCli,
};
use snack_describe::GenerationOptions;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: DescribeCli = parse_payload();
    let name = cli.snack_name.as_deref();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let settings = match load_settings(cli.config.as_deref(), cli.log_level.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            return exit_code(run_describe_fallback(name, &e, &mut stdout, &mut stderr));
        }
    };
    if let Err(e) = init_logging(&settings.log_level) {
        let _ = writeln!(stderr, "Logging disabled: {:#}", e);
    }

    let generator = match build_generator(&settings.generation) {
        Ok(generator) => generator,
        Err(e) => {
            report_json_error(&mut stderr, &e);
            return ExitCode::FAILURE;
        }
    };
    let options = GenerationOptions::from(&settings.generation);

    exit_code(run_describe(&generator, name, &options, &mut stdout, &mut stderr).await)
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_json_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}
