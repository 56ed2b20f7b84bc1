//! Token-classification state machine.
//!
//! Consumes the tokenized word sequence against a
//! [`CommandSpec`](tabline_core::CommandSpec), classifying each word as an
//! option marker, an option value, or a positional argument, and
//! assembling a [`CommandLine`] result. The same populate pass drives both
//! the execute path ([`parse_line`]) and the completion path
//! ([`complete_line`](crate::complete_line)), so the two can never drift
//! apart.
//!
//! Recoverable errors are deferred onto the result (first error wins) and
//! parsing continues best-effort; the one fatal case is a first word that
//! matches neither the schema's name nor an alias.

use tabline_core::{BoundOption, BoundValues, CommandSpec, LongLookup, OptionKind, OptionSpec};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::resolve;
use crate::tokenizer::{ParsedWord, tokenize};

/// Result of parsing one line.
///
/// Created fresh per invocation; the schema itself is never mutated.
///
/// # Examples
///
/// ```
/// use tabline_core::{ArgumentSpec, CommandSpec, OptionSpec};
/// use tabline_parser::parse_line;
///
/// let schema = CommandSpec::new("test")
///     .with_option(OptionSpec::boolean(Some('f'), Some("force")))
///     .with_argument(ArgumentSpec::new("files"));
///
/// let line = parse_line(&schema, "test -f notes.txt");
/// assert!(line.is_clean());
/// assert!(line.is_set("force"));
/// assert_eq!(line.argument(), ["notes.txt"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    /// Resolved command path, e.g. `"net connect"` after group dispatch.
    pub command: String,
    /// The per-parse value snapshot.
    pub values: BoundValues,
    /// First recoverable error met while parsing, if any.
    pub deferred: Option<ParseError>,
}

impl CommandLine {
    fn fatal(error: ParseError) -> Self {
        Self {
            command: String::new(),
            values: BoundValues::default(),
            deferred: Some(error),
        }
    }

    /// Whether parsing finished without a deferred error.
    pub fn is_clean(&self) -> bool {
        self.deferred.is_none()
    }

    /// Whether the named option was bound.
    pub fn is_set(&self, name: &str) -> bool {
        self.values.is_set(name)
    }

    /// First committed value of the named option.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.values.value_of(name)
    }

    /// All committed values of the named option.
    pub fn values_of(&self, name: &str) -> Option<&[String]> {
        self.values.values_of(name)
    }

    /// Property map of the named option.
    pub fn properties_of(&self, name: &str) -> Option<&std::collections::BTreeMap<String, String>> {
        self.values.properties_of(name)
    }

    /// Positional argument values.
    pub fn argument(&self) -> &[String] {
        &self.values.argument
    }
}

/// Shared mutable state of one populate pass.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    pub(crate) values: BoundValues,
    pub(crate) deferred: Option<ParseError>,
}

impl Accumulator {
    /// Records a recoverable error; the first one wins.
    pub(crate) fn defer(&mut self, error: ParseError) {
        if self.deferred.is_none() {
            debug!(%error, "deferring parse error");
            self.deferred = Some(error);
        }
    }

    /// Binding for `spec`, created empty on first access. Repeated
    /// occurrences of the same option merge into one binding.
    fn binding_mut(&mut self, spec: &OptionSpec) -> &mut BoundOption {
        let index = match self
            .values
            .options
            .iter()
            .position(|bound| same_option(&bound.spec, spec))
        {
            Some(index) => index,
            None => {
                self.values.options.push(BoundOption::new(spec));
                self.values.options.len() - 1
            }
        };
        &mut self.values.options[index]
    }
}

fn same_option(a: &OptionSpec, b: &OptionSpec) -> bool {
    a.short == b.short && a.long == b.long
}

/// Outcome of one populate pass: the matched schema chain and the option
/// still awaiting a value when the words ran out.
pub(crate) struct Populated<'s> {
    pub(crate) levels: Vec<&'s CommandSpec>,
    pub(crate) active: Option<&'s OptionSpec>,
}

impl<'s> Populated<'s> {
    /// The innermost matched command.
    pub(crate) fn effective(&self, root: &'s CommandSpec) -> &'s CommandSpec {
        self.levels.last().copied().unwrap_or(root)
    }
}

/// Classification of a single word against the current schema level.
enum Step<'s> {
    /// No recognized option form; a value or positional word.
    Plain,
    /// A matched option, possibly with an inline (`=` or attached) value.
    Flag {
        spec: &'s OptionSpec,
        inline: Option<String>,
    },
    /// A grouped short bundle; only the boolean members resolved.
    Bundle {
        specs: Vec<&'s OptionSpec>,
        error: Option<ParseError>,
    },
    /// A property option with the raw `key=value` text after its marker.
    Property { spec: &'s OptionSpec, raw: String },
    /// Option-shaped but unresolvable.
    Unknown(ParseError),
}

/// Runs the state machine over `words` (the words after the command
/// name), dispatching into child commands as they match. Shared verbatim
/// by the execute and completion paths.
pub(crate) fn populate<'s>(
    schema: &'s CommandSpec,
    words: &[ParsedWord],
    acc: &mut Accumulator,
) -> Populated<'s> {
    let mut levels = vec![schema];
    let mut current = schema;
    let mut pending: Option<&'s OptionSpec> = None;

    for word in words {
        let text = word.text.as_str();
        let step = classify(current, text);

        // Any option-shaped word ends a pending value accumulation.
        if pending.is_some() && !matches!(step, Step::Plain) {
            pending = None;
        }

        match step {
            Step::Plain => {
                if let Some(spec) = pending {
                    if append_value(acc, spec, text) {
                        pending = None;
                    }
                } else if current.is_group()
                    && let Some(child) = current.find_child(text)
                {
                    debug!(parent = %current.name, child = %child.name, "dispatching to child");
                    current = child;
                    levels.push(child);
                } else {
                    append_argument(acc, current, text);
                }
            }
            Step::Flag {
                spec,
                inline: Some(value),
            } => {
                trace!(option = %spec.display_name(), %value, "inline option value");
                append_value(acc, spec, &value);
            }
            Step::Flag { spec, inline: None } => {
                if spec.kind.accepts_value() {
                    trace!(option = %spec.display_name(), "option awaiting value");
                    acc.binding_mut(spec);
                    pending = Some(spec);
                } else {
                    acc.binding_mut(spec).values.push("true".to_string());
                }
            }
            Step::Bundle { specs, error } => {
                for spec in specs {
                    acc.binding_mut(spec).values.push("true".to_string());
                }
                if let Some(error) = error {
                    acc.defer(error);
                }
            }
            Step::Property { spec, raw } => commit_property(acc, spec, &raw, text),
            Step::Unknown(error) => acc.defer(error),
        }
    }

    Populated {
        levels,
        active: pending,
    }
}

fn classify<'s>(schema: &'s CommandSpec, word: &str) -> Step<'s> {
    if let Some(rest) = word.strip_prefix("--") {
        // A bare "--" is positional text, not an option marker.
        if rest.is_empty() {
            return Step::Plain;
        }
        let (name, inline) = match rest.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (rest, None),
        };
        return match schema.resolve_long(name) {
            LongLookup::Found(spec) if spec.kind == OptionKind::Property => match inline {
                Some(raw) => Step::Property { spec, raw },
                None => Step::Unknown(ParseError::PropertyFormat(word.to_string())),
            },
            LongLookup::Found(spec) => Step::Flag { spec, inline },
            LongLookup::Ambiguous => {
                debug!(%word, "long option prefix is ambiguous");
                Step::Unknown(ParseError::UnknownOption(word.to_string()))
            }
            LongLookup::Unknown => Step::Unknown(ParseError::UnknownOption(word.to_string())),
        };
    }

    let Some(rest) = word.strip_prefix('-') else {
        return Step::Plain;
    };
    // A lone dash is positional text (stdin convention).
    let Some(first) = rest.chars().next() else {
        return Step::Plain;
    };
    let tail = &rest[first.len_utf8()..];

    match schema.find_short(first) {
        Some(spec) if spec.kind == OptionKind::Property => Step::Property {
            spec,
            raw: tail.to_string(),
        },
        Some(spec) => {
            if tail.is_empty() {
                Step::Flag { spec, inline: None }
            } else if let Some(value) = tail.strip_prefix('=') {
                Step::Flag {
                    spec,
                    inline: Some(value.to_string()),
                }
            } else if spec.kind.accepts_value() {
                // -nvalue: the remainder is the option's inline value.
                Step::Flag {
                    spec,
                    inline: Some(tail.to_string()),
                }
            } else {
                decompose_bundle(schema, word, rest)
            }
        }
        None => Step::Unknown(ParseError::UnknownOption(word.to_string())),
    }
}

/// Decomposes `-abc` into boolean shorts, best-effort: members that do
/// resolve still commit even when another member fails.
fn decompose_bundle<'s>(schema: &'s CommandSpec, word: &str, body: &str) -> Step<'s> {
    let mut specs = Vec::new();
    let mut error = None;
    for ch in body.chars() {
        match schema.find_short(ch) {
            Some(spec) if !spec.kind.accepts_value() => specs.push(spec),
            Some(spec) => {
                if error.is_none() {
                    error = Some(ParseError::InvalidGroupedOption {
                        bundle: word.to_string(),
                        option: spec.display_name(),
                    });
                }
            }
            None => {
                if error.is_none() {
                    error = Some(ParseError::UnknownOption(format!("-{ch}")));
                }
            }
        }
    }
    debug!(%word, resolved = specs.len(), "decomposed short option bundle");
    Step::Bundle { specs, error }
}

/// Appends one word's worth of value to an option binding. Returns true
/// when the option is finalized: always for single-valued kinds, and for
/// multi-valued kinds once the word contained the separator.
fn append_value(acc: &mut Accumulator, spec: &OptionSpec, word: &str) -> bool {
    let separator = spec.value_separator;
    match spec.kind {
        OptionKind::List => {
            let had_separator = word.contains(separator);
            let segments: Vec<String> = word
                .split(separator)
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect();
            acc.binding_mut(spec).values.extend(segments);
            had_separator
        }
        OptionKind::Group => {
            let had_separator = word.contains(separator);
            let segments: Vec<String> = word
                .split(separator)
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect();
            for segment in segments {
                bind_pair(acc, spec, &segment, word);
            }
            had_separator
        }
        _ => {
            acc.binding_mut(spec).values.push(word.to_string());
            true
        }
    }
}

/// Binds one `key=value` segment into a property-map option.
fn bind_pair(acc: &mut Accumulator, spec: &OptionSpec, segment: &str, source: &str) {
    match segment.split_once('=') {
        Some((key, value)) if !key.is_empty() => {
            acc.binding_mut(spec)
                .properties
                .insert(key.to_string(), value.to_string());
        }
        _ => acc.defer(ParseError::PropertyFormat(source.to_string())),
    }
}

fn commit_property(acc: &mut Accumulator, spec: &OptionSpec, raw: &str, word: &str) {
    if raw.is_empty() || !raw.contains('=') {
        acc.defer(ParseError::PropertyFormat(word.to_string()));
        return;
    }
    bind_pair(acc, spec, raw, word);
}

fn append_argument(acc: &mut Accumulator, schema: &CommandSpec, word: &str) {
    if let Some(argument) = &schema.argument
        && word.contains(argument.value_separator)
    {
        acc.values.argument.extend(
            word.split(argument.value_separator)
                .filter(|segment| !segment.is_empty())
                .map(String::from),
        );
    } else {
        acc.values.argument.push(word.to_string());
    }
}

/// Parses `line` against `schema`, enforcing required options.
///
/// # Examples
///
/// ```
/// use tabline_core::{CommandSpec, OptionSpec};
/// use tabline_parser::{ParseError, parse_line};
///
/// let schema = CommandSpec::new("greet")
///     .with_option(OptionSpec::single(Some('n'), Some("name")).required());
///
/// let missing = parse_line(&schema, "greet");
/// assert!(matches!(missing.deferred, Some(ParseError::RequiredOptionMissing(_))));
///
/// let ok = parse_line(&schema, "greet --name=world");
/// assert!(ok.is_clean());
/// assert_eq!(ok.value_of("name"), Some("world"));
/// ```
pub fn parse_line(schema: &CommandSpec, line: &str) -> CommandLine {
    parse_with(schema, line, false)
}

/// Parses `line` with required-option and missing-value checks disabled,
/// as the completion path does for partially-typed input.
pub fn parse_line_lenient(schema: &CommandSpec, line: &str) -> CommandLine {
    parse_with(schema, line, true)
}

fn parse_with(schema: &CommandSpec, line: &str, ignore_requirements: bool) -> CommandLine {
    let scan = tokenize(line);
    let Some((first, rest)) = scan.words.split_first() else {
        return CommandLine::fatal(ParseError::UnknownCommand(line.trim().to_string()));
    };
    if !schema.matches_name(&first.text) {
        debug!(word = %first.text, schema = %schema.name, "command name mismatch");
        return CommandLine::fatal(ParseError::UnknownCommand(first.text.clone()));
    }

    let mut acc = Accumulator::default();
    if scan.open_quote {
        acc.defer(ParseError::ParserStatus(
            "line ends inside an unterminated quote".to_string(),
        ));
    }

    let populated = populate(schema, rest, &mut acc);

    if let Some(spec) = populated.active
        && !ignore_requirements
    {
        let committed = acc
            .values
            .get(&spec.display_name())
            .is_some_and(|bound| !bound.values.is_empty() || !bound.properties.is_empty());
        if !committed {
            acc.defer(ParseError::MissingValue(spec.display_name()));
        }
    }

    resolve::resolve_levels(&populated.levels, &mut acc, ignore_requirements);

    let command = populated
        .levels
        .iter()
        .map(|level| level.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    debug!(%command, options = acc.values.options.len(), "parsed line");

    CommandLine {
        command,
        values: acc.values,
        deferred: acc.deferred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabline_core::ArgumentSpec;

    fn schema() -> CommandSpec {
        CommandSpec::new("test")
            .with_option(OptionSpec::boolean(Some('f'), Some("force")))
            .with_option(OptionSpec::single(Some('e'), Some("equal")).required())
            .with_option(OptionSpec::property(Some('D'), None))
            .with_option(OptionSpec::list(Some('o'), Some("objects")))
            .with_argument(ArgumentSpec::new("files"))
    }

    #[test]
    fn equals_and_space_value_forms_are_equivalent() {
        for line in ["test --equal=bar", "test --equal bar", "test -e bar", "test -e=bar"] {
            let parsed = parse_line(&schema(), line);
            assert!(parsed.is_clean(), "unexpected error for {line}: {:?}", parsed.deferred);
            assert_eq!(parsed.value_of("equal"), Some("bar"), "for {line}");
        }
    }

    #[test]
    fn short_option_takes_attached_inline_value() {
        let parsed = parse_line(&schema(), "test -ebar");
        assert_eq!(parsed.value_of("equal"), Some("bar"));
    }

    #[test]
    fn long_option_resolves_by_unambiguous_prefix() {
        let parsed = parse_line(&schema(), "test --eq bar");
        assert_eq!(parsed.value_of("equal"), Some("bar"));
    }

    #[test]
    fn ambiguous_long_prefix_is_an_unknown_option() {
        let spec = CommandSpec::new("test")
            .with_option(OptionSpec::boolean(None, Some("verbose")))
            .with_option(OptionSpec::boolean(None, Some("version")));
        let parsed = parse_line(&spec, "test --ver");
        assert_eq!(
            parsed.deferred,
            Some(ParseError::UnknownOption("--ver".to_string()))
        );
    }

    #[test]
    fn grouped_booleans_commit_independently_of_order() {
        let spec = CommandSpec::new("test")
            .with_option(OptionSpec::boolean(Some('a'), None))
            .with_option(OptionSpec::boolean(Some('b'), None))
            .with_option(OptionSpec::boolean(Some('c'), None));

        let forward = parse_line(&spec, "test -abc");
        let backward = parse_line(&spec, "test -cba");
        for parsed in [&forward, &backward] {
            assert!(parsed.is_clean());
            for name in ["a", "b", "c"] {
                assert_eq!(parsed.value_of(name), Some("true"));
            }
        }
    }

    #[test]
    fn bundle_with_value_taking_member_defers_but_commits_the_rest() {
        let parsed = parse_line(&schema(), "test -fe bar");
        assert!(matches!(
            parsed.deferred,
            Some(ParseError::InvalidGroupedOption { .. })
        ));
        assert_eq!(parsed.value_of("force"), Some("true"));
        // "bar" is positional: the bundle never opened a pending value.
        assert_eq!(parsed.argument(), ["bar"]);
    }

    #[test]
    fn unknown_option_defers_and_parsing_continues() {
        let parsed = parse_line(&schema(), "test -e bar --wat /tmp/x");
        assert_eq!(
            parsed.deferred,
            Some(ParseError::UnknownOption("--wat".to_string()))
        );
        assert_eq!(parsed.value_of("equal"), Some("bar"));
        assert_eq!(parsed.argument(), ["/tmp/x"]);
    }

    #[test]
    fn property_requires_key_equals_value() {
        for line in ["test -e x -D", "test -e x -Dkey"] {
            let parsed = parse_line(&schema(), line);
            assert!(
                matches!(parsed.deferred, Some(ParseError::PropertyFormat(_))),
                "expected property error for {line}"
            );
        }
    }

    #[test]
    fn repeated_properties_merge_into_one_map() {
        let parsed = parse_line(&schema(), "test -e x -Da=1 -Db=2");
        let properties = parsed.properties_of("D").expect("-D bound");
        assert_eq!(properties.get("a"), Some(&"1".to_string()));
        assert_eq!(properties.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn list_accumulates_until_separator_is_seen() {
        let parsed = parse_line(&schema(), "test -e x -o a b c");
        assert_eq!(
            parsed.values_of("objects"),
            Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
        );
        assert!(parsed.argument().is_empty());

        let split = parse_line(&schema(), "test -e x -o a,b tail");
        assert_eq!(
            split.values_of("objects"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(split.argument(), ["tail"]);
    }

    #[test]
    fn custom_separator_splits_exclusively_on_that_char() {
        let spec = CommandSpec::new("test")
            .with_option(OptionSpec::list(Some('o'), Some("objects")).with_separator(':'));
        let parsed = parse_line(&spec, "test -o a:b,c");
        assert_eq!(
            parsed.values_of("objects"),
            Some(&["a".to_string(), "b,c".to_string()][..])
        );
    }

    #[test]
    fn group_kind_binds_segments_as_pairs() {
        let spec = CommandSpec::new("test")
            .with_option(OptionSpec::group(None, Some("env")));
        let parsed = parse_line(&spec, "test --env a=1,b=2 --env c=3");
        let properties = parsed.properties_of("env").expect("--env bound");
        assert_eq!(properties.len(), 3);
        assert_eq!(properties.get("c"), Some(&"3".to_string()));
    }

    #[test]
    fn value_taking_option_at_end_of_line_is_missing_a_value() {
        let parsed = parse_line(&schema(), "test --equal");
        assert_eq!(
            parsed.deferred,
            Some(ParseError::MissingValue("--equal".to_string()))
        );
        // The option still counts as present.
        assert!(parsed.is_set("equal"));
    }

    #[test]
    fn lenient_parse_suppresses_requirement_checks() {
        let parsed = parse_line_lenient(&schema(), "test --equal");
        assert!(parsed.is_clean());
    }

    #[test]
    fn command_name_mismatch_is_fatal() {
        let parsed = parse_line(&schema(), "toast -f");
        assert_eq!(
            parsed.deferred,
            Some(ParseError::UnknownCommand("toast".to_string()))
        );
        assert!(parsed.values.options.is_empty());
        assert_eq!(
            parsed.deferred.as_ref().map(ParseError::severity),
            Some(crate::error::Severity::Fatal)
        );
    }

    #[test]
    fn aliases_match_the_command_name() {
        let spec = CommandSpec::new("archive")
            .with_alias("ar")
            .with_option(OptionSpec::boolean(Some('f'), None));
        let parsed = parse_line(&spec, "ar -f");
        assert!(parsed.is_clean());
        assert_eq!(parsed.command, "archive");
    }

    #[test]
    fn lone_dashes_are_positional_words() {
        let parsed = parse_line(&schema(), "test -e x - --");
        assert!(parsed.is_clean());
        assert_eq!(parsed.argument(), ["-", "--"]);
    }

    #[test]
    fn open_quote_defers_a_parser_status_error() {
        let parsed = parse_line(&schema(), "test -e \"unclosed value");
        assert!(matches!(parsed.deferred, Some(ParseError::ParserStatus(_))));
        // Best-effort: the quoted text still reached the option.
        assert_eq!(parsed.value_of("equal"), Some("unclosed value"));
    }

    #[test]
    fn group_dispatch_allows_parent_options_before_the_child() {
        let spec = CommandSpec::new("net")
            .with_option(OptionSpec::boolean(Some('v'), Some("verbose")))
            .with_child(
                CommandSpec::new("connect")
                    .with_alias("c")
                    .with_option(OptionSpec::single(Some('h'), Some("host")))
                    .with_argument(ArgumentSpec::new("interface")),
            );

        let parsed = parse_line(&spec, "net -v connect --host alpha eth0");
        assert!(parsed.is_clean());
        assert_eq!(parsed.command, "net connect");
        assert_eq!(parsed.value_of("verbose"), Some("true"));
        assert_eq!(parsed.value_of("host"), Some("alpha"));
        assert_eq!(parsed.argument(), ["eth0"]);

        let aliased = parse_line(&spec, "net c --host beta");
        assert_eq!(aliased.command, "net connect");
        assert_eq!(aliased.value_of("host"), Some("beta"));
    }

    #[test]
    fn parsing_is_stateless_across_invocations() {
        let spec = schema();
        let first = parse_line(&spec, "test -f -e bar -Df=g /tmp/file.txt");
        let second = parse_line(&spec, "test -f -e bar -Df=g /tmp/file.txt");
        assert_eq!(first, second);
    }
}
