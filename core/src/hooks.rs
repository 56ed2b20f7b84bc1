//! External hook traits consulted while generating completions.
//!
//! Hooks are supplied by the embedding application and attached to schema
//! entries as `Arc<dyn ...>` trait objects. Both traits are implemented
//! for plain closures, so simple hooks need no named type.
//!
//! ```
//! use std::sync::Arc;
//! use tabline_core::{BoundValues, OptionSpec, ValueCompleter};
//!
//! let hosts: Arc<dyn ValueCompleter> = Arc::new(|partial: &str, _: &BoundValues| {
//!     ["alpha", "beta"]
//!         .iter()
//!         .filter(|host| host.starts_with(partial))
//!         .map(|host| host.to_string())
//!         .collect::<Vec<_>>()
//! });
//!
//! let spec = OptionSpec::single(Some('h'), Some("host")).with_completer(hosts);
//! assert!(spec.completer.is_some());
//! ```

use crate::values::BoundValues;

/// Candidate source for an option or argument value.
///
/// Invoked with the partially-typed value and the populated snapshot of
/// the line so far, so candidates can depend on sibling option state.
/// Implementations are responsible for filtering by the partial.
pub trait ValueCompleter: Send + Sync {
    /// Returns replacement candidates for `partial`.
    fn complete(&self, partial: &str, bound: &BoundValues) -> Vec<String>;

    /// Whether a uniquely-matching candidate should get a trailing
    /// separator appended. Defaults to `true`.
    fn append_separator(&self) -> bool {
        true
    }
}

impl<F> ValueCompleter for F
where
    F: Fn(&str, &BoundValues) -> Vec<String> + Send + Sync,
{
    fn complete(&self, partial: &str, bound: &BoundValues) -> Vec<String> {
        self(partial, bound)
    }
}

/// Eligibility predicate for an option.
///
/// Consulted while listing option-name candidates; an inactive option is
/// left out of the candidate set. Activation logic itself (inter-option
/// dependencies and the like) belongs to the embedding application.
pub trait OptionActivator: Send + Sync {
    /// Whether the option is currently eligible given the line state.
    fn is_active(&self, bound: &BoundValues) -> bool;
}

impl<F> OptionActivator for F
where
    F: Fn(&BoundValues) -> bool + Send + Sync,
{
    fn is_active(&self, bound: &BoundValues) -> bool {
        self(bound)
    }
}
