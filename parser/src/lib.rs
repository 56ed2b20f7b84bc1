//! Command-line parsing and tab-completion engine.
//!
//! This crate turns a raw input line and a declarative
//! [`CommandSpec`](tabline_core::CommandSpec) into either a parsed
//! [`CommandLine`] (the execute path) or ranked, offset-correct
//! [`Completions`] (the complete path). Both paths share one tokenizer
//! and one populate pass, so "parse to execute" and "parse to complete"
//! can never disagree about how a line reads.
//!
//! # Main entry points
//!
//! - [`parse_line`] — parse a full line, enforcing required options and
//!   injecting defaults; errors are deferred onto the result.
//! - [`parse_line_lenient`] — the same pass with requirement checks
//!   disabled, for partially-typed input.
//! - [`complete_line`] — classify what the cursor is completing and
//!   generate candidates with a precise replacement offset.
//! - [`tokenize`] — the underlying word splitter, exposed for embedders
//!   that need offsets or the open-quote flag directly.
//!
//! # Example
//!
//! ```
//! use tabline_core::{ArgumentSpec, CommandSpec, OptionSpec};
//! use tabline_parser::{CompletionStatus, complete_line, parse_line};
//!
//! let schema = CommandSpec::new("test")
//!     .with_option(OptionSpec::boolean(Some('f'), Some("force")))
//!     .with_option(OptionSpec::single(Some('e'), Some("equal")).required())
//!     .with_argument(ArgumentSpec::new("files"));
//!
//! let line = parse_line(&schema, "test -f -e bar /tmp/file.txt");
//! assert!(line.is_clean());
//! assert_eq!(line.value_of("equal"), Some("bar"));
//! assert_eq!(line.argument(), ["/tmp/file.txt"]);
//!
//! let completions = complete_line(&schema, "test --eq", 9);
//! assert_eq!(completions.context.status, CompletionStatus::LongOptionName);
//! assert_eq!(completions.candidates, ["--equal"]);
//! assert_eq!(completions.offset, 7);
//! ```
//!
//! # Concurrency
//!
//! Every call is a pure computation over the schema and the input string:
//! the schema is never mutated, and per-parse state lives in a fresh
//! [`BoundValues`](tabline_core::BoundValues) snapshot, so concurrent
//! calls against one schema are safe.

pub mod complete;
pub mod error;
pub mod parse;
mod resolve;
pub mod tokenizer;

pub use complete::{CompletionContext, CompletionStatus, Completions, complete_line};
pub use error::{ParseError, Severity};
pub use parse::{CommandLine, parse_line, parse_line_lenient};
pub use tokenizer::{ParsedWord, TokenizedLine, escape_spaces, tokenize};
