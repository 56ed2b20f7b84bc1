//! Schema type definitions for command-line option modeling.
//!
//! This module defines the declarative data model the parsing and
//! completion engine operates on. The types serialize with [`serde`] so a
//! schema can be written as a JSON or YAML value as well as built in code;
//! the external hook fields (completers, activators) are runtime-only and
//! skipped during serialization.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hooks::{OptionActivator, ValueCompleter};

/// Separator used to split multi-value option words when none is
/// configured (`-o a,b,c`).
pub const DEFAULT_VALUE_SEPARATOR: char = ',';

fn default_separator() -> char {
    DEFAULT_VALUE_SEPARATOR
}

/// Value shape of an option.
///
/// Decides whether an option consumes following tokens, how many values it
/// accumulates, and how its values are interpreted.
///
/// # Examples
///
/// ```
/// use tabline_core::OptionKind;
///
/// assert_eq!(OptionKind::default(), OptionKind::Single);
/// assert!(!OptionKind::Boolean.accepts_value());
/// assert!(OptionKind::List.multi_valued());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OptionKind {
    /// Presence-only flag. Never consumes a following token; presence
    /// commits the value `"true"`.
    Boolean,
    /// Exactly one value (the default).
    #[default]
    Single,
    /// Multiple values, accumulated across tokens and split on the
    /// configured separator. A token containing the separator ends the
    /// accumulation.
    List,
    /// Like [`List`](OptionKind::List), but every committed segment is a
    /// `key=value` pair bound into a property map.
    Group,
    /// Key/value pairs attached directly to the marker (`-Dkey=value`),
    /// repeatable.
    Property,
}

impl OptionKind {
    /// Whether this kind consumes a value at all.
    pub fn accepts_value(self) -> bool {
        !matches!(self, OptionKind::Boolean)
    }

    /// Whether this kind keeps accumulating values across tokens.
    pub fn multi_valued(self) -> bool {
        matches!(self, OptionKind::List | OptionKind::Group)
    }

    /// Whether committed values bind into a property map.
    pub fn is_property_map(self) -> bool {
        matches!(self, OptionKind::Group | OptionKind::Property)
    }
}

/// Schema for a single option.
///
/// An option has an optional short form (e.g. `-v`) and/or long form
/// (e.g. `--verbose`) — at least one must be present — an [`OptionKind`],
/// and optional metadata: defaults, requirement flags, a custom value
/// separator, and external completion/activation hooks.
///
/// Use the kind constructors ([`boolean`](OptionSpec::boolean),
/// [`single`](OptionSpec::single), [`list`](OptionSpec::list),
/// [`group`](OptionSpec::group), [`property`](OptionSpec::property)) and
/// chain builder methods.
///
/// # Examples
///
/// ```
/// use tabline_core::{OptionKind, OptionSpec};
///
/// let verbose = OptionSpec::boolean(Some('v'), Some("verbose"))
///     .with_description("Enable verbose output");
/// assert_eq!(verbose.display_name(), "--verbose");
/// assert!(!verbose.kind.accepts_value());
///
/// let output = OptionSpec::single(Some('o'), Some("output")).required();
/// assert!(output.required);
/// assert_eq!(output.kind, OptionKind::Single);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Short form character (`-v`).
    #[serde(default)]
    pub short: Option<char>,
    /// Long form name without the leading dashes (`verbose`).
    #[serde(default)]
    pub long: Option<String>,
    /// Value shape.
    #[serde(default)]
    pub kind: OptionKind,
    /// Whether the option must be present once the line is resolved.
    #[serde(default)]
    pub required: bool,
    /// Presence of this option satisfies every required check for the
    /// command (`--help` style).
    #[serde(default)]
    pub overrides_required: bool,
    /// Separator splitting multi-value words.
    #[serde(default = "default_separator")]
    pub value_separator: char,
    /// Values injected by the resolver when the user supplies none.
    #[serde(default)]
    pub default_values: Vec<String>,
    /// Display/help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Candidate source for value completion.
    #[serde(skip)]
    pub completer: Option<Arc<dyn ValueCompleter>>,
    /// Eligibility predicate consulted while listing option candidates.
    #[serde(skip)]
    pub activator: Option<Arc<dyn OptionActivator>>,
}

impl OptionSpec {
    fn with_kind(short: Option<char>, long: Option<&str>, kind: OptionKind) -> Self {
        Self {
            short,
            long: long.map(String::from),
            kind,
            required: false,
            overrides_required: false,
            value_separator: DEFAULT_VALUE_SEPARATOR,
            default_values: Vec::new(),
            description: None,
            completer: None,
            activator: None,
        }
    }

    /// Creates a presence-only boolean option.
    pub fn boolean(short: Option<char>, long: Option<&str>) -> Self {
        Self::with_kind(short, long, OptionKind::Boolean)
    }

    /// Creates an option taking exactly one value.
    pub fn single(short: Option<char>, long: Option<&str>) -> Self {
        Self::with_kind(short, long, OptionKind::Single)
    }

    /// Creates a multi-value option split on the configured separator.
    pub fn list(short: Option<char>, long: Option<&str>) -> Self {
        Self::with_kind(short, long, OptionKind::List)
    }

    /// Creates a multi-value option whose segments bind as `key=value`
    /// pairs.
    pub fn group(short: Option<char>, long: Option<&str>) -> Self {
        Self::with_kind(short, long, OptionKind::Group)
    }

    /// Creates a property option (`-Dkey=value`).
    pub fn property(short: Option<char>, long: Option<&str>) -> Self {
        Self::with_kind(short, long, OptionKind::Property)
    }

    /// Marks the option required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the option as satisfying every required check when present.
    pub fn overrides_required(mut self) -> Self {
        self.overrides_required = true;
        self
    }

    /// Sets the multi-value separator character.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.value_separator = separator;
        self
    }

    /// Appends a default value.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_values.push(value.to_string());
        self
    }

    /// Replaces the default values, keeping declared order.
    pub fn with_defaults<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Attaches a value completer hook.
    pub fn with_completer(mut self, completer: Arc<dyn ValueCompleter>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Attaches an activation hook.
    pub fn with_activator(mut self, activator: Arc<dyn OptionActivator>) -> Self {
        self.activator = Some(activator);
        self
    }

    /// Returns the display name: long form preferred (`--verbose`), short
    /// form otherwise (`-v`).
    ///
    /// # Examples
    ///
    /// ```
    /// use tabline_core::OptionSpec;
    ///
    /// assert_eq!(OptionSpec::boolean(Some('v'), Some("verbose")).display_name(), "--verbose");
    /// assert_eq!(OptionSpec::boolean(Some('v'), None).display_name(), "-v");
    /// ```
    pub fn display_name(&self) -> String {
        if let Some(long) = self.long.as_deref() {
            format!("--{long}")
        } else if let Some(short) = self.short {
            format!("-{short}")
        } else {
            "<unnamed>".to_string()
        }
    }

    /// Checks whether `ch` is this option's short form.
    pub fn has_short(&self, ch: char) -> bool {
        self.short == Some(ch)
    }

    /// Checks whether `name` (without dashes) is this option's long form.
    pub fn has_long(&self, name: &str) -> bool {
        self.long.as_deref() == Some(name)
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("overrides_required", &self.overrides_required)
            .field("value_separator", &self.value_separator)
            .field("default_values", &self.default_values)
            .field("description", &self.description)
            .field("completer", &self.completer.is_some())
            .field("activator", &self.activator.is_some())
            .finish()
    }
}

// Hooks are identity-less callbacks; equality covers the declarative
// fields only.
impl PartialEq for OptionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.short == other.short
            && self.long == other.long
            && self.kind == other.kind
            && self.required == other.required
            && self.overrides_required == other.overrides_required
            && self.value_separator == other.value_separator
            && self.default_values == other.default_values
            && self.description == other.description
    }
}

/// Schema for the positional argument.
///
/// At most one per command; accumulates every leftover word that did not
/// match an option form, with the same multi-value shape as a list option.
///
/// # Examples
///
/// ```
/// use tabline_core::ArgumentSpec;
///
/// let files = ArgumentSpec::new("files").with_description("Input files");
/// assert_eq!(files.name, "files");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Display name of the argument.
    pub name: String,
    /// Display/help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Separator splitting multi-value words, as for list options.
    #[serde(default = "default_separator")]
    pub value_separator: char,
    /// Values injected by the resolver when the user supplies none.
    #[serde(default)]
    pub default_values: Vec<String>,
    /// Candidate source for argument completion.
    #[serde(skip)]
    pub completer: Option<Arc<dyn ValueCompleter>>,
}

impl ArgumentSpec {
    /// Creates an argument descriptor with the given display name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            value_separator: DEFAULT_VALUE_SEPARATOR,
            default_values: Vec::new(),
            completer: None,
        }
    }

    /// Sets the multi-value separator character.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.value_separator = separator;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Replaces the default values.
    pub fn with_defaults<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches a value completer hook.
    pub fn with_completer(mut self, completer: Arc<dyn ValueCompleter>) -> Self {
        self.completer = Some(completer);
        self
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("value_separator", &self.value_separator)
            .field("default_values", &self.default_values)
            .field("completer", &self.completer.is_some())
            .finish()
    }
}

impl PartialEq for ArgumentSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.value_separator == other.value_separator
            && self.default_values == other.default_values
    }
}

/// Result of a long-option lookup by exact name or unambiguous prefix.
#[derive(Debug, Clone, Copy)]
pub enum LongLookup<'a> {
    /// Exactly one option matches (exact name, or a unique prefix).
    Found(&'a OptionSpec),
    /// The prefix matches more than one option; never silently picks one.
    Ambiguous,
    /// Nothing matches.
    Unknown,
}

/// Complete schema for a command.
///
/// A command is either a leaf (options and an optional positional
/// argument) or a group (non-empty `children`): group commands dispatch on
/// the word following their name before considering their own options,
/// whenever that word matches a child's name or alias.
///
/// The schema is immutable after construction. Parsing never mutates it;
/// accumulated values live in a per-parse
/// [`BoundValues`](crate::BoundValues) snapshot.
///
/// # Examples
///
/// ```
/// use tabline_core::*;
///
/// let spec = CommandSpec::new("archive")
///     .with_alias("ar")
///     .with_option(OptionSpec::list(Some('o'), Some("objects")))
///     .with_argument(ArgumentSpec::new("path"));
///
/// assert!(spec.matches_name("ar"));
/// assert!(spec.find_short('o').is_some());
/// assert!(matches!(spec.resolve_long("obj"), LongLookup::Found(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Primary command name.
    pub name: String,
    /// Alternative names the command answers to.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Display/help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Options, in declaration order. Names are unique within a command.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// The positional argument, if the command takes one.
    #[serde(default)]
    pub argument: Option<ArgumentSpec>,
    /// Child commands. Non-empty only for group commands.
    #[serde(default)]
    pub children: Vec<CommandSpec>,
}

impl CommandSpec {
    /// Creates a command schema with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds an option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Sets the positional argument.
    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Adds a child command.
    pub fn with_child(mut self, child: CommandSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Whether this command dispatches to children.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Checks a word against the command's name and aliases.
    pub fn matches_name(&self, word: &str) -> bool {
        self.name == word || self.aliases.iter().any(|alias| alias == word)
    }

    /// Finds an option by its short form character.
    pub fn find_short(&self, ch: char) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.has_short(ch))
    }

    /// Finds an option by its exact long name (without dashes).
    pub fn find_long(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.has_long(name))
    }

    /// Resolves a long name exactly, else by unambiguous prefix.
    ///
    /// A prefix matching more than one option resolves to
    /// [`LongLookup::Ambiguous`] — never the first candidate.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabline_core::{CommandSpec, LongLookup, OptionSpec};
    ///
    /// let spec = CommandSpec::new("test")
    ///     .with_option(OptionSpec::boolean(None, Some("verbose")))
    ///     .with_option(OptionSpec::boolean(None, Some("version")));
    ///
    /// assert!(matches!(spec.resolve_long("verbose"), LongLookup::Found(_)));
    /// assert!(matches!(spec.resolve_long("verb"), LongLookup::Found(_)));
    /// assert!(matches!(spec.resolve_long("ver"), LongLookup::Ambiguous));
    /// assert!(matches!(spec.resolve_long("colour"), LongLookup::Unknown));
    /// ```
    pub fn resolve_long(&self, name: &str) -> LongLookup<'_> {
        if let Some(option) = self.find_long(name) {
            return LongLookup::Found(option);
        }
        if name.is_empty() {
            return LongLookup::Unknown;
        }

        let mut matches = self.options.iter().filter(|option| {
            option
                .long
                .as_deref()
                .is_some_and(|long| long.starts_with(name))
        });
        match (matches.next(), matches.next()) {
            (Some(option), None) => LongLookup::Found(option),
            (Some(_), Some(_)) => LongLookup::Ambiguous,
            (None, _) => LongLookup::Unknown,
        }
    }

    /// Lists long option names starting with `prefix`, in declaration
    /// order. Used by completion.
    pub fn long_names_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.options
            .iter()
            .filter_map(|option| option.long.as_deref())
            .filter(|long| long.starts_with(prefix))
            .collect()
    }

    /// Finds a child command by name or alias.
    pub fn find_child(&self, word: &str) -> Option<&CommandSpec> {
        self.children.iter().find(|child| child.matches_name(word))
    }
}
