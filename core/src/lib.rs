//! Schema model and value types for the tabline completion engine.
//!
//! This crate defines the declarative description of a command that the
//! parser and completion builder in `tabline-parser` operate on:
//!
//! - [`CommandSpec`] — a command: name, aliases, options, an optional
//!   positional argument, and child commands for group dispatch.
//! - [`OptionSpec`] — a named option with short/long forms, a value
//!   [`OptionKind`], defaults, and requirement flags.
//! - [`ArgumentSpec`] — the positional argument descriptor.
//! - [`BoundValues`] / [`BoundOption`] — the per-parse value snapshot
//!   produced by a parse run. The schema itself stays read-only; every
//!   parse builds a fresh snapshot, so one [`CommandSpec`] can serve any
//!   number of concurrent parse or completion calls.
//! - [`ValueCompleter`] / [`OptionActivator`] — external hooks consulted
//!   while generating completion candidates.
//!
//! Validation ([`validate_command`]) catches structural errors such as
//! duplicate option names, malformed long names, and a group command that
//! also declares a positional argument.
//!
//! # Example
//!
//! ```
//! use tabline_core::*;
//!
//! let spec = CommandSpec::new("net")
//!     .with_option(OptionSpec::boolean(Some('v'), Some("verbose")))
//!     .with_child(
//!         CommandSpec::new("connect")
//!             .with_option(OptionSpec::single(Some('h'), Some("host")).required())
//!             .with_argument(ArgumentSpec::new("interface")),
//!     );
//!
//! assert!(spec.is_group());
//! assert!(spec.find_child("connect").is_some());
//! assert!(spec.find_short('v').is_some());
//! assert!(validate_command(&spec).is_empty());
//! ```

mod hooks;
mod types;
mod validate;
mod values;

pub use hooks::{OptionActivator, ValueCompleter};
pub use types::{
    ArgumentSpec, CommandSpec, DEFAULT_VALUE_SEPARATOR, LongLookup, OptionKind, OptionSpec,
};
pub use validate::{ValidationError, validate_command};
pub use values::{BoundOption, BoundValues};
