//! Snack tools library exports.
//!
//! Each binary is a thin `main` over this crate:
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations writing to injected stdout/stderr
//! - `logging`: tracing subscriber setup (stderr only)

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{
    parse_or_report, parse_payload, parse_payload_from, BatchCli, DescribeCli, PayloadCli,
    RecommendCli, SingleEmbeddingCli,
};
pub use commands::{
    build_generator, candle_loader, load_catalog, load_settings, report_json_error, run_batch,
    run_describe, run_describe_fallback, run_recommend, run_single_embedding, LoadedModel,
    ModelLoader,
};
pub use logging::init_logging;
