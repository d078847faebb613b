//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Data directory | `init`, `config` |
//! | Plant | Record lifecycle | `add`, `list`, `show`, `update`, `remove` |
//! | Care | Care events | `water`, `fertilize` |
//! | Health | Status derivation | `scan`, `watch` |
//! | Views | Derived summaries | `stats`, `upcoming` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including the library's
//! `tracing` events (`RUST_LOG` overrides the filter):
//! ```bash
//! botaniq --verbose scan
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod logger;
mod output;
mod plant;
mod query;
mod session;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
