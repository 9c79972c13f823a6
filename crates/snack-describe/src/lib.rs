//! # snack-describe
//!
//! One-sentence snack descriptions from a text-generation model.
//!
//! The model sits behind the [`TextGenerator`] trait; [`describe`] builds the
//! prompt, strips an echoed prompt from the continuation, and substitutes a
//! templated fallback sentence when generation fails. The outcome is a
//! [`Description`] so callers can tell the two cases apart.

pub mod description;
pub mod generator;

pub use description::{
    build_prompt, describe, fallback_description, resolve_snack_name, strip_prompt_echo,
    Description, DEFAULT_SNACK_NAME,
};
pub use generator::{
    GenerationError, GenerationOptions, HfInferenceConfig, HfInferenceGenerator, MockGenerator,
    TextGenerator,
};
