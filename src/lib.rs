//! **ctxpack** - Fast Rust CLI for assembling, optimizing, and
//! splitting source-code context artifacts for LLM workflows.
//!
//! Smart gitignore-aware walking with parallel optimization, tree-sitter
//! symbol extraction, and streaming assembly for large projects.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core processing pipeline
pub mod core {
    /// Shared error type and `Result` alias
    pub mod error;
    pub use error::{PipelineError, Result};

    /// Token approximation, path normalization, cancellation
    pub mod util;

    /// Text-vs-binary content classification
    pub mod classify;
    pub use classify::ContentType;

    /// Per-file content optimization: whitespace, comments, license
    /// headers, data compaction, and AST-driven skeletons.
    pub mod optimize;
    pub use optimize::{OptimizeOptions, OptimizeStats, optimize_batch, optimize_content};
    pub use optimize::skeleton::{Analyzer, AnalyzerRegistry, Import, Symbol, SymbolKind};

    /// Context artifact formatting (plain/manifest/json/markdown/xml)
    pub mod format;
    pub use format::{Entry, OutputFormat, format_context, parse_context};

    /// Token-budgeted artifact splitting
    pub mod split;
    pub use split::{SplitSettings, SplitStrategy, split};

    /// Unified-diff, hunk-boundary-aware splitting
    pub mod diffsplit;
    pub use diffsplit::split_diff;

    /// Streaming context assembly with spill-to-disk and pagination
    pub mod stream;
    pub use stream::{BuildResult, MemoryRisk, StreamingContext, build_context, build_streaming};
}

/// Language analyzers - tree-sitter symbol and import extraction
pub mod parsers {
    /// Rust symbol extraction with tree-sitter
    pub mod rust_analyzer;
    pub use rust_analyzer::RustAnalyzer;

    /// Python symbol extraction with tree-sitter
    pub mod python_analyzer;
    pub use python_analyzer::PythonAnalyzer;
}

/// Infrastructure - configuration, I/O, and utilities
pub mod infra {
    /// Layered configuration: `ctxpack.toml` + `CTXPACK_` env vars
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MiB threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart};

    /// CRLF/LF-robust line indexing for O(1) line→byte mapping
    pub mod line_index;
    pub use line_index::NewlineIndex;

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use walk::FileWalker;

    /// Tree-sitter node helpers shared by the analyzers
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{PipelineError, build_context, optimize_content, split};
pub use infra::{Config, FileWalker, load_config};
pub use parsers::{PythonAnalyzer, RustAnalyzer};

// Core types for external consumers
pub use core::optimize::skeleton::{Analyzer, AnalyzerRegistry, Import, Symbol, SymbolKind};
