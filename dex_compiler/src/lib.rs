#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const DEX_COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Parsing
pub mod blocks;
pub mod dispatch;
pub mod encounters;
pub mod schema;
pub mod settings;
pub mod tokenizer;
pub mod version;

// Passes
pub mod evolution;
pub mod extension;
pub mod forms;
pub mod propagate;

// Pipeline and I/O
pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod fetch;

// Re-exports for convenience
pub use config::{CompilerConfig, load_config};
pub use driver::{CompileContext, SourceTexts, compile, compile_texts};
pub use emit::write_outputs;
pub use error::CompileError;
pub use fetch::{DirFetcher, Fetch, HttpFetcher, fetcher_for};
pub use version::FormatVersion;
