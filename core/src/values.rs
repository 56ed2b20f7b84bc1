//! Per-parse value snapshot.
//!
//! Parsing never writes into the schema. Every parse or completion call
//! builds a fresh [`BoundValues`] holding the options that were matched
//! and the values they accumulated, which keeps a single
//! [`CommandSpec`](crate::CommandSpec) safe to share across calls and
//! threads. Completion hooks receive the snapshot read-only so a completer
//! can depend on sibling option state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::OptionSpec;

/// An option matched during a parse, together with its committed values.
///
/// # Examples
///
/// ```
/// use tabline_core::{BoundOption, OptionSpec};
///
/// let spec = OptionSpec::single(Some('e'), Some("equal"));
/// let mut bound = BoundOption::new(&spec);
/// bound.values.push("bar".to_string());
/// assert_eq!(bound.display_name(), "--equal");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundOption {
    /// The schema entry this binding belongs to.
    pub spec: OptionSpec,
    /// Committed values, in commit order.
    #[serde(default)]
    pub values: Vec<String>,
    /// Key/value pairs for property-map kinds.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// True when the values were injected from the spec's defaults rather
    /// than supplied on the line.
    #[serde(default)]
    pub from_defaults: bool,
}

impl BoundOption {
    /// Creates an empty binding for the given option.
    pub fn new(spec: &OptionSpec) -> Self {
        Self {
            spec: spec.clone(),
            values: Vec::new(),
            properties: BTreeMap::new(),
            from_defaults: false,
        }
    }

    /// Display name of the underlying option.
    pub fn display_name(&self) -> String {
        self.spec.display_name()
    }

    /// Matches a lookup name against the option's short or long form.
    ///
    /// Leading dashes are ignored, so `"e"`, `"-e"`, `"equal"`, and
    /// `"--equal"` all address the same option.
    pub fn matches(&self, name: &str) -> bool {
        let stripped = name.trim_start_matches('-');
        if self.spec.long.as_deref() == Some(stripped) {
            return true;
        }
        let mut chars = stripped.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.spec.has_short(ch),
            _ => false,
        }
    }
}

/// The complete value snapshot produced by one parse run.
///
/// # Examples
///
/// ```
/// use tabline_core::{BoundOption, BoundValues, OptionSpec};
///
/// let mut values = BoundValues::default();
/// let mut bound = BoundOption::new(&OptionSpec::single(Some('e'), Some("equal")));
/// bound.values.push("bar".to_string());
/// values.options.push(bound);
///
/// assert!(values.is_set("equal"));
/// assert!(values.is_set("-e"));
/// assert_eq!(values.value_of("equal"), Some("bar"));
/// assert!(values.value_of("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundValues {
    /// Matched options with their values.
    #[serde(default)]
    pub options: Vec<BoundOption>,
    /// Positional argument values, in order of appearance.
    #[serde(default)]
    pub argument: Vec<String>,
}

impl BoundValues {
    /// Finds a binding by short or long name (dashes optional).
    pub fn get(&self, name: &str) -> Option<&BoundOption> {
        self.options.iter().find(|bound| bound.matches(name))
    }

    /// Whether the named option was bound (by the user or defaults).
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First committed value of the named option.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|bound| bound.values.first())
            .map(String::as_str)
    }

    /// All committed values of the named option.
    pub fn values_of(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|bound| bound.values.as_slice())
    }

    /// Property map of the named option, for property-map kinds.
    pub fn properties_of(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).map(|bound| &bound.properties)
    }

    /// Whether any user-supplied binding overrides the required checks.
    pub fn overrides_required(&self) -> bool {
        self.options
            .iter()
            .any(|bound| !bound.from_defaults && bound.spec.overrides_required)
    }
}
