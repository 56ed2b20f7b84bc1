use tabline_core::{ArgumentSpec, CommandSpec, OptionSpec};
use tabline_parser::{ParseError, parse_line};

/// The reference schema most scenarios run against: a boolean `-f`, a
/// required string `-e/--equal`, a property `-D`, a list `-o/--objects`,
/// and a positional argument.
fn reference_schema() -> CommandSpec {
    CommandSpec::new("test")
        .with_option(OptionSpec::boolean(Some('f'), Some("force")))
        .with_option(OptionSpec::single(Some('e'), Some("equal")).required())
        .with_option(OptionSpec::property(Some('D'), None))
        .with_option(OptionSpec::list(Some('o'), Some("objects")))
        .with_argument(ArgumentSpec::new("files"))
}

#[test]
fn full_line_resolves_every_option_kind() {
    let parsed = parse_line(&reference_schema(), "test -f -e bar -Df=g /tmp/file.txt");

    assert!(parsed.is_clean(), "unexpected error: {:?}", parsed.deferred);
    assert_eq!(parsed.value_of("f"), Some("true"));
    assert_eq!(parsed.value_of("equal"), Some("bar"));
    assert_eq!(
        parsed.properties_of("D").and_then(|map| map.get("f")),
        Some(&"g".to_string())
    );
    assert_eq!(parsed.argument(), ["/tmp/file.txt"]);
}

#[test]
fn unknown_bundle_member_defers_while_the_rest_resolves() {
    let parsed = parse_line(&reference_schema(), "test -fXe -Df=g /tmp/file.txt");

    assert!(
        matches!(
            parsed.deferred,
            Some(ParseError::UnknownOption(_)) | Some(ParseError::InvalidGroupedOption { .. })
        ),
        "expected a grouped-option error, got {:?}",
        parsed.deferred
    );
    assert_eq!(parsed.value_of("force"), Some("true"), "missing -f");
    assert_eq!(
        parsed.properties_of("D").and_then(|map| map.get("f")),
        Some(&"g".to_string()),
        "missing -D binding"
    );
    assert_eq!(parsed.argument(), ["/tmp/file.txt"]);
}

#[test]
fn list_option_splits_on_separator_and_leaves_the_argument() {
    let parsed = parse_line(&reference_schema(), "test -e x -o bar1,bar2,bar3 foo");

    assert_eq!(
        parsed.values_of("objects"),
        Some(&["bar1".to_string(), "bar2".to_string(), "bar3".to_string()][..])
    );
    assert_eq!(parsed.argument(), ["foo"]);
}

#[test]
fn missing_required_option_names_it_in_the_deferred_error() {
    let parsed = parse_line(&reference_schema(), "test -f /tmp/file.txt");

    match parsed.deferred {
        Some(ParseError::RequiredOptionMissing(ref name)) => {
            assert!(name.contains("equal"), "unexpected name: {name}")
        }
        other => panic!("expected missing-required, got {other:?}"),
    }
    // Partial results stay usable next to the deferred error.
    assert_eq!(parsed.value_of("force"), Some("true"));
    assert_eq!(parsed.argument(), ["/tmp/file.txt"]);
}

#[test]
fn overrides_required_option_silences_the_check() {
    let schema = reference_schema()
        .with_option(OptionSpec::boolean(Some('h'), Some("help")).overrides_required());
    let parsed = parse_line(&schema, "test --help");
    assert!(parsed.is_clean());
}

#[test]
fn inline_and_spaced_values_commit_identically() {
    let schema = reference_schema();
    let spaced = parse_line(&schema, "test -e bar");
    let inline_short = parse_line(&schema, "test -e=bar");
    let inline_long = parse_line(&schema, "test --equal=bar");

    for parsed in [&spaced, &inline_short, &inline_long] {
        assert_eq!(parsed.value_of("equal"), Some("bar"));
    }
}

#[test]
fn defaults_fill_unset_options_in_declared_order() {
    let schema = CommandSpec::new("render")
        .with_option(OptionSpec::list(None, Some("layers")).with_defaults(["base", "overlay"]));
    let parsed = parse_line(&schema, "render");
    assert_eq!(
        parsed.values_of("layers"),
        Some(&["base".to_string(), "overlay".to_string()][..])
    );
}

#[test]
fn escaped_spaces_survive_into_argument_values() {
    let parsed = parse_line(&reference_schema(), "test -e x /tmp/my\\ file.txt");
    assert_eq!(parsed.argument(), ["/tmp/my file.txt"]);
}

#[test]
fn quoted_values_keep_embedded_whitespace() {
    let parsed = parse_line(&reference_schema(), "test -e \"hello world\" out.txt");
    assert_eq!(parsed.value_of("equal"), Some("hello world"));
    assert_eq!(parsed.argument(), ["out.txt"]);
}

#[test]
fn group_command_dispatches_through_two_levels() {
    let schema = CommandSpec::new("remote")
        .with_option(OptionSpec::boolean(Some('v'), Some("verbose")))
        .with_child(
            CommandSpec::new("branch").with_child(
                CommandSpec::new("add")
                    .with_option(OptionSpec::single(Some('n'), Some("name")).required())
                    .with_argument(ArgumentSpec::new("url")),
            ),
        );

    let parsed = parse_line(&schema, "remote -v branch add --name origin https://example.com");
    assert!(parsed.is_clean(), "unexpected error: {:?}", parsed.deferred);
    assert_eq!(parsed.command, "remote branch add");
    assert_eq!(parsed.value_of("verbose"), Some("true"));
    assert_eq!(parsed.value_of("name"), Some("origin"));
    assert_eq!(parsed.argument(), ["https://example.com"]);
}

#[test]
fn child_required_options_are_enforced_after_dispatch() {
    let schema = CommandSpec::new("net").with_child(
        CommandSpec::new("connect")
            .with_option(OptionSpec::single(Some('h'), Some("host")).required()),
    );

    let parsed = parse_line(&schema, "net connect");
    assert!(matches!(
        parsed.deferred,
        Some(ParseError::RequiredOptionMissing(_))
    ));
    assert_eq!(parsed.command, "net connect");
}

#[test]
fn words_matching_no_child_fall_through_to_the_argument() {
    let schema = CommandSpec::new("net")
        .with_child(CommandSpec::new("connect").with_argument(ArgumentSpec::new("interface")));

    let parsed = parse_line(&schema, "net connect eth0 eth1");
    assert_eq!(parsed.command, "net connect");
    assert_eq!(parsed.argument(), ["eth0", "eth1"]);
}

#[test]
fn repeated_parses_of_one_schema_stay_independent() {
    let schema = reference_schema();

    let first = parse_line(&schema, "test -e one alpha");
    let second = parse_line(&schema, "test -e two beta");

    // No accumulated state bleeds from the first parse into the second.
    assert_eq!(first.value_of("equal"), Some("one"));
    assert_eq!(second.value_of("equal"), Some("two"));
    assert_eq!(first.argument(), ["alpha"]);
    assert_eq!(second.argument(), ["beta"]);

    let again = parse_line(&schema, "test -e one alpha");
    assert_eq!(first, again);
}
