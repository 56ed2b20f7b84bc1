//! Post-parse resolution: default injection and required checks.
//!
//! Runs once per parse over the matched schema chain (parent levels first
//! when a group dispatched). Value-taking options with no committed value
//! receive their configured defaults, marked `from_defaults`; boolean
//! options stay unset — absence means false. Required checks come last so
//! an `overrides_required` option anywhere on the line (a `--help` style
//! escape hatch) can satisfy them all.

use tabline_core::{BoundOption, BoundValues, CommandSpec};
use tracing::debug;

use crate::error::ParseError;
use crate::parse::Accumulator;

/// Resolves every matched schema level in dispatch order.
pub(crate) fn resolve_levels(
    levels: &[&CommandSpec],
    acc: &mut Accumulator,
    ignore_requirements: bool,
) {
    for level in levels {
        apply_defaults(level, &mut acc.values);
    }

    if ignore_requirements || acc.values.overrides_required() {
        return;
    }
    for level in levels {
        for option in &level.options {
            if option.required && !satisfied(&acc.values, option) {
                acc.defer(ParseError::RequiredOptionMissing(option.display_name()));
            }
        }
    }
}

fn satisfied(values: &BoundValues, option: &tabline_core::OptionSpec) -> bool {
    values.get(&option.display_name()).is_some()
}

/// Injects configured defaults into options the user left unset (or set
/// without managing to commit a value), and into an empty positional
/// argument.
fn apply_defaults(schema: &CommandSpec, values: &mut BoundValues) {
    for option in &schema.options {
        if !option.kind.accepts_value() || option.default_values.is_empty() {
            continue;
        }

        let existing = values
            .options
            .iter_mut()
            .find(|bound| bound.spec.short == option.short && bound.spec.long == option.long);
        match existing {
            Some(bound) if !bound.values.is_empty() || !bound.properties.is_empty() => continue,
            Some(bound) => {
                fill_defaults(bound, option);
            }
            None => {
                let mut bound = BoundOption::new(option);
                fill_defaults(&mut bound, option);
                values.options.push(bound);
            }
        }
        debug!(option = %option.display_name(), "injected default values");
    }

    if let Some(argument) = &schema.argument
        && values.argument.is_empty()
        && !argument.default_values.is_empty()
    {
        values.argument = argument.default_values.clone();
    }
}

fn fill_defaults(bound: &mut BoundOption, option: &tabline_core::OptionSpec) {
    bound.from_defaults = true;
    if option.kind.is_property_map() {
        for value in &option.default_values {
            if let Some((key, pair_value)) = value.split_once('=') {
                bound
                    .properties
                    .insert(key.to_string(), pair_value.to_string());
            }
        }
    } else {
        bound.values = option.default_values.clone();
    }
}
