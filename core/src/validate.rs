//! Structural schema validation.
//!
//! Validates the invariants a [`CommandSpec`] must hold before it is
//! handed to the parser: non-empty names, options with at least one form,
//! well-formed long names, unique option and child names, and the
//! leaf-or-group rule (a group command does not also declare a positional
//! argument).
//!
//! # Examples
//!
//! ```
//! use tabline_core::*;
//!
//! let spec = CommandSpec::new("net")
//!     .with_option(OptionSpec::boolean(Some('v'), Some("verbose")));
//! assert!(validate_command(&spec).is_empty());
//!
//! // Invalid: two options share the short form.
//! let bad = CommandSpec::new("net")
//!     .with_option(OptionSpec::boolean(Some('v'), Some("verbose")))
//!     .with_option(OptionSpec::boolean(Some('v'), Some("version")));
//! assert!(!validate_command(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::CommandSpec;

/// Structural problems found in a command schema.
///
/// Each variant names the offending entry; the `Display` impl renders a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// An option declares neither a short nor a long form.
    #[error("option must define a short or long form")]
    MissingOptionName,
    /// Long name contains whitespace, `=`, or a leading dash.
    #[error("invalid long option name: {0}")]
    InvalidLongName(String),
    /// Two options in the same command share a short or long form.
    #[error("duplicate option in command {command}: {option}")]
    DuplicateOption {
        /// Command the clash occurs in.
        command: String,
        /// Display name of the clashing option.
        option: String,
    },
    /// Two children of the same command share a name or alias.
    #[error("duplicate child command: {0}")]
    DuplicateChild(String),
    /// A group command also declares a positional argument.
    #[error("group command {0} cannot declare an argument")]
    GroupWithArgument(String),
}

/// Validates a command schema, recursing into children.
///
/// Returns every problem found; an empty vector means the schema is
/// structurally sound.
///
/// # Examples
///
/// ```
/// use tabline_core::*;
///
/// let bad = CommandSpec::new("net")
///     .with_argument(ArgumentSpec::new("iface"))
///     .with_child(CommandSpec::new("connect"));
///
/// let errors = validate_command(&bad);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::GroupWithArgument(_))));
/// ```
pub fn validate_command(spec: &CommandSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_into(spec, &mut errors);
    errors
}

fn validate_into(spec: &CommandSpec, errors: &mut Vec<ValidationError>) {
    if spec.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
    }

    if spec.is_group() && spec.argument.is_some() {
        errors.push(ValidationError::GroupWithArgument(spec.name.clone()));
    }

    let mut seen_shorts: HashSet<char> = HashSet::new();
    let mut seen_longs: HashSet<&str> = HashSet::new();
    for option in &spec.options {
        if option.short.is_none() && option.long.is_none() {
            errors.push(ValidationError::MissingOptionName);
            continue;
        }

        if let Some(long) = option.long.as_deref() {
            if long.is_empty()
                || long.starts_with('-')
                || long.contains(char::is_whitespace)
                || long.contains('=')
            {
                errors.push(ValidationError::InvalidLongName(long.to_string()));
            }
            if !seen_longs.insert(long) {
                errors.push(ValidationError::DuplicateOption {
                    command: spec.name.clone(),
                    option: option.display_name(),
                });
            }
        }
        if let Some(short) = option.short
            && !seen_shorts.insert(short)
        {
            errors.push(ValidationError::DuplicateOption {
                command: spec.name.clone(),
                option: option.display_name(),
            });
        }
    }

    let mut seen_children: HashSet<&str> = HashSet::new();
    for child in &spec.children {
        if !seen_children.insert(child.name.as_str()) {
            errors.push(ValidationError::DuplicateChild(child.name.clone()));
        }
        for alias in &child.aliases {
            if !seen_children.insert(alias.as_str()) {
                errors.push(ValidationError::DuplicateChild(alias.clone()));
            }
        }
        validate_into(child, errors);
    }
}
