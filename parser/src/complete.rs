//! Completion context reconstruction and candidate generation.
//!
//! Given a partial line and a cursor offset, re-runs the tokenizer and
//! the populate pass in a non-failing mode to classify what is being
//! completed — an option name, an option value, or the positional
//! argument — and at which buffer offset the replacement starts. The
//! populate pass is the same one the execute path uses, with requirement
//! checks disabled so partially-typed input never raises; every parser
//! error encountered along the way is discarded and the broadest
//! applicable candidate set is produced instead.

use std::sync::Arc;

use serde::Serialize;
use tabline_core::{BoundValues, CommandSpec, OptionSpec, ValueCompleter};
use tracing::debug;

use crate::parse::{Accumulator, populate};
use crate::resolve;
use crate::tokenizer::{escape_spaces, escaped_len, tokenize};

/// What the cursor position is completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Inside a token beginning with `--`; completing a long option name.
    LongOptionName,
    /// The token is exactly `-`; the candidate is a second dash.
    ShortOptionMarker,
    /// An option was matched but its value is still missing.
    OptionMissingValue,
    /// Completing the value of the active option.
    OptionValue,
    /// Completing the positional argument.
    Argument,
    /// Nothing specific to narrow; candidates list the remaining options.
    Inactive,
}

/// Classification of the cursor position within the line.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionContext {
    /// Cursor offset the completion was requested at.
    pub cursor: usize,
    /// What is being completed.
    pub status: CompletionStatus,
    /// The option whose value is being completed, when one is active.
    pub active_option: Option<OptionSpec>,
    /// The partially-typed text being replaced. For long option names
    /// this is the text after the `--` marker.
    pub partial: String,
}

/// Ranked candidates plus the replacement geometry.
///
/// `offset` is the byte offset in the original buffer where the
/// replacement starts; it never exceeds the cursor. When
/// `ignore_starts_with` is set the caller must not re-filter the
/// candidates by prefix. `append_space` marks a unique candidate that
/// should receive a trailing separator once inserted.
#[derive(Debug, Clone, Serialize)]
pub struct Completions {
    /// Cursor classification.
    pub context: CompletionContext,
    /// Replacement start offset into the original buffer.
    pub offset: usize,
    /// Candidates are already narrowed; do not re-filter by prefix.
    pub ignore_starts_with: bool,
    /// Append a trailing separator after inserting the candidate.
    pub append_space: bool,
    /// Ranked replacement candidates.
    pub candidates: Vec<String>,
}

impl Completions {
    fn inactive(cursor: usize) -> Self {
        Self {
            context: CompletionContext {
                cursor,
                status: CompletionStatus::Inactive,
                active_option: None,
                partial: String::new(),
            },
            offset: cursor,
            ignore_starts_with: false,
            append_space: false,
            candidates: Vec::new(),
        }
    }
}

/// Builds the completion context and candidates for `line` at `cursor`.
///
/// # Examples
///
/// ```
/// use tabline_core::{CommandSpec, OptionSpec};
/// use tabline_parser::{CompletionStatus, complete_line};
///
/// let schema = CommandSpec::new("test")
///     .with_option(OptionSpec::single(Some('e'), Some("equal")));
///
/// let completions = complete_line(&schema, "test --eq", 9);
/// assert_eq!(completions.context.status, CompletionStatus::LongOptionName);
/// assert_eq!(completions.candidates, ["--equal"]);
/// assert_eq!(completions.offset, 7);
/// assert!(completions.append_space);
/// ```
pub fn complete_line(schema: &CommandSpec, line: &str, cursor: usize) -> Completions {
    let mut cursor = cursor.min(line.len());
    while cursor > 0 && !line.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let prefix = &line[..cursor];
    let scan = tokenize(prefix);

    let trailing_space = scan
        .words
        .last()
        .is_none_or(|word| word.end < prefix.len());
    let (partial_word, complete_words) = if trailing_space {
        (None, scan.words.as_slice())
    } else {
        match scan.words.split_last() {
            Some((last, init)) => (Some(last), init),
            None => (None, scan.words.as_slice()),
        }
    };

    // The command name itself (and anything before it) is the caller's
    // concern; without a matching first word there is nothing to narrow.
    let Some((first, option_words)) = complete_words.split_first() else {
        return Completions::inactive(cursor);
    };
    if !schema.matches_name(&first.text) {
        return Completions::inactive(cursor);
    }

    // Populate with validation disabled: partially-typed input never
    // raises, and default-populated sibling values stay visible to value
    // completers.
    let mut acc = Accumulator::default();
    let populated = populate(schema, option_words, &mut acc);
    resolve::resolve_levels(&populated.levels, &mut acc, true);
    let effective = populated.effective(schema);
    let values = acc.values;

    if let Some(active) = populated.active {
        let committed = values
            .get(&active.display_name())
            .is_some_and(|bound| {
                !bound.from_defaults && (!bound.values.is_empty() || !bound.properties.is_empty())
            });
        let partial = partial_word
            .map(|word| word.text.clone())
            .unwrap_or_default();
        let status = if partial_word.is_some() || committed {
            CompletionStatus::OptionValue
        } else {
            CompletionStatus::OptionMissingValue
        };
        debug!(?status, option = %active.display_name(), "completing option value");

        let (offset, append_space, candidates) = value_candidates(
            active.completer.as_ref(),
            &active.default_values,
            &partial,
            &values,
            cursor,
        );
        return Completions {
            context: CompletionContext {
                cursor,
                status,
                active_option: Some(active.clone()),
                partial,
            },
            offset,
            ignore_starts_with: false,
            append_space,
            candidates,
        };
    }

    if let Some(word) = partial_word {
        let text = word.text.as_str();

        if let Some(after) = text.strip_prefix("--") {
            let (offset, ignore_starts_with, append_space, candidates) =
                option_name_candidates(effective, after, &values, cursor);
            debug!(partial = after, count = candidates.len(), "completing long option name");
            return Completions {
                context: CompletionContext {
                    cursor,
                    status: CompletionStatus::LongOptionName,
                    active_option: None,
                    partial: after.to_string(),
                },
                offset,
                ignore_starts_with,
                append_space,
                candidates,
            };
        }

        if text == "-" {
            // Typing a lone dash offers the second dash itself; kept for
            // shell muscle-memory compatibility.
            return Completions {
                context: CompletionContext {
                    cursor,
                    status: CompletionStatus::ShortOptionMarker,
                    active_option: None,
                    partial: "-".to_string(),
                },
                offset: cursor,
                ignore_starts_with: true,
                append_space: false,
                candidates: vec!["-".to_string()],
            };
        }

        if let Some(argument) = &effective.argument {
            let (offset, append_space, candidates) = value_candidates(
                argument.completer.as_ref(),
                &argument.default_values,
                text,
                &values,
                cursor,
            );
            return Completions {
                context: CompletionContext {
                    cursor,
                    status: CompletionStatus::Argument,
                    active_option: None,
                    partial: text.to_string(),
                },
                offset,
                ignore_starts_with: false,
                append_space,
                candidates,
            };
        }

        return Completions::inactive(cursor);
    }

    // Trailing space with nothing pending: the argument when the command
    // declares one, otherwise list the remaining option names.
    if let Some(argument) = &effective.argument {
        let (offset, append_space, candidates) = value_candidates(
            argument.completer.as_ref(),
            &argument.default_values,
            "",
            &values,
            cursor,
        );
        return Completions {
            context: CompletionContext {
                cursor,
                status: CompletionStatus::Argument,
                active_option: None,
                partial: String::new(),
            },
            offset,
            ignore_starts_with: false,
            append_space,
            candidates,
        };
    }

    let (offset, ignore_starts_with, append_space, candidates) =
        option_name_candidates(effective, "", &values, cursor);
    Completions {
        context: CompletionContext {
            cursor,
            status: CompletionStatus::Inactive,
            active_option: None,
            partial: String::new(),
        },
        offset,
        ignore_starts_with,
        append_space,
        candidates,
    }
}

/// Long option names matching `prefix`, minus options that are already
/// bound (unless they accumulate) or currently inactive. A unique match
/// replaces the typed prefix and takes a trailing separator; multiple
/// matches replace from the cursor with `ignore_starts_with` set.
fn option_name_candidates(
    schema: &CommandSpec,
    prefix: &str,
    values: &BoundValues,
    cursor: usize,
) -> (usize, bool, bool, Vec<String>) {
    let mut names: Vec<&str> = schema
        .options
        .iter()
        .filter(|option| selectable(option, values))
        .filter_map(|option| option.long.as_deref())
        .filter(|long| long.starts_with(prefix))
        .collect();
    names.sort_unstable();
    names.dedup();

    match names.as_slice() {
        [] => (cursor, false, false, Vec::new()),
        [single] => (
            cursor.saturating_sub(prefix.len()),
            false,
            true,
            vec![format!("--{single}")],
        ),
        _ => (
            cursor,
            true,
            false,
            names.iter().map(|name| format!("--{name}")).collect(),
        ),
    }
}

fn selectable(option: &OptionSpec, values: &BoundValues) -> bool {
    if let Some(activator) = &option.activator
        && !activator.is_active(values)
    {
        return false;
    }
    let used = values
        .get(&option.display_name())
        .is_some_and(|bound| !bound.from_defaults);
    !used || option.kind.multi_valued()
}

/// Candidates for an option or argument value: the completer hook when
/// one is attached, else the configured defaults verbatim. Embedded
/// spaces are re-escaped so the replacement survives re-tokenization, and
/// the replacement offset counts each escaped space as two bytes.
fn value_candidates(
    completer: Option<&Arc<dyn ValueCompleter>>,
    defaults: &[String],
    partial: &str,
    values: &BoundValues,
    cursor: usize,
) -> (usize, bool, Vec<String>) {
    let (pool, separator_allowed) = match completer {
        Some(completer) => (completer.complete(partial, values), completer.append_separator()),
        None => (defaults.to_vec(), true),
    };

    let mut candidates: Vec<String> = pool.iter().map(|candidate| escape_spaces(candidate)).collect();
    candidates.sort_unstable();
    candidates.dedup();

    let append_space = separator_allowed && candidates.len() == 1;
    let offset = cursor.saturating_sub(escaped_len(partial));
    (offset, append_space, candidates)
}
