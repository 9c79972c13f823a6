//! CLI argument parsing for the snack tools.
//!
//! Every tool accepts `--config` and `--log-level`; CLI flags override all
//! other config sources.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

/// Generate a short, fun description for a Nepali snack.
///
/// Prints one JSON string to stdout. Falls back to a templated sentence
/// when the text-generation model fails.
#[derive(Parser, Debug)]
#[command(name = "generate-description")]
#[command(author, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct DescribeCli {
    /// Path to config file (overrides default ~/.config/nepali-snacks/config.toml)
    #[arg(long, require_equals = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, require_equals = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Snack name (defaults to "A Nepali snack" when missing or blank)
    #[arg(allow_hyphen_values = true)]
    pub snack_name: Option<String>,
}

impl PayloadCli for DescribeCli {
    fn from_payload(payload: Option<String>) -> Self {
        Self {
            config: None,
            log_level: None,
            snack_name: payload,
        }
    }
}

/// Embed every catalog description and write the embeddings document.
#[derive(Parser, Debug)]
#[command(name = "generate-embeddings")]
#[command(author, version, long_about = None)]
pub struct BatchCli {
    /// Path to config file (overrides default ~/.config/nepali-snacks/config.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the output document path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON catalog to embed instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Print the embedding vector of one text as a JSON array.
#[derive(Parser, Debug)]
#[command(name = "generate-single-embedding")]
#[command(author, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct SingleEmbeddingCli {
    /// Path to config file (overrides default ~/.config/nepali-snacks/config.toml)
    #[arg(long, require_equals = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, require_equals = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Text to embed
    #[arg(allow_hyphen_values = true)]
    pub text: Option<String>,
}

impl PayloadCli for SingleEmbeddingCli {
    fn from_payload(payload: Option<String>) -> Self {
        Self {
            config: None,
            log_level: None,
            text: payload,
        }
    }
}

/// Recommend snacks similar to a catalog entry.
#[derive(Parser, Debug)]
#[command(name = "recommend-snacks")]
#[command(author, version, long_about = None)]
pub struct RecommendCli {
    /// Path to config file (overrides default ~/.config/nepali-snacks/config.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Embeddings document to read (defaults to the configured output path)
    #[arg(short, long)]
    pub embeddings: Option<PathBuf>,

    /// Snack to find recommendations for
    pub snack_name: String,
}

/// A tool whose positional argument is its whole input.
///
/// Such tools take `--config=PATH` and `--log-level=LEVEL` only in `=` form
/// and have no help or version flags, so any other first argument is data.
pub trait PayloadCli: Parser {
    /// The command with `payload` as its argument and no flags.
    fn from_payload(payload: Option<String>) -> Self;
}

/// Parse process arguments for a [`PayloadCli`] tool. Never fails.
pub fn parse_payload<P: PayloadCli>() -> P {
    parse_payload_from(std::env::args_os())
}

/// Parse `args` (program name first). When they do not form a valid command
/// line, the first argument is taken verbatim as the payload.
pub fn parse_payload_from<P, I, T>(args: I) -> P
where
    P: PayloadCli,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match P::try_parse_from(args.iter().cloned()) {
        Ok(cli) => cli,
        Err(_) => P::from_payload(args.get(1).map(|arg| arg.to_string_lossy().into_owned())),
    }
}

/// Parse process arguments.
///
/// Help and version requests print and exit as usual. Other parse errors are
/// reported on stderr (as `{"error": ...}` when `json_errors` is set) and
/// turned into exit code 1.
pub fn parse_or_report<P: Parser>(json_errors: bool) -> Result<P, ExitCode> {
    match P::try_parse() {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            if json_errors {
                let rendered = e.render().to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .trim_start_matches("error: ");
                let mut stderr = std::io::stderr();
                crate::commands::report_json_error(&mut stderr, &anyhow::anyhow!("{}", message));
            } else {
                let _ = e.print();
            }
            Err(ExitCode::FAILURE)
        }
    }
}
