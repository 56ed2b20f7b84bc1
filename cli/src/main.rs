use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tabline_core::{CommandSpec, validate_command};
use tabline_parser::{CommandLine, complete_line, parse_line, parse_line_lenient};

#[derive(Debug, Parser)]
#[command(name = "tabline")]
#[command(about = "Parse and complete command lines against a declarative schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a line against a schema file and print the resolved result.
    Parse(ParseArgs),
    /// Produce completion candidates for a line and cursor position.
    Complete(CompleteArgs),
    /// Check a schema file for structural problems.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file: JSON, or YAML for .yaml/.yml extensions.
    #[arg(long)]
    schema: PathBuf,
    /// Skip required-option and missing-value checks.
    #[arg(long)]
    ignore_requirements: bool,
    /// The input line to parse.
    line: String,
}

#[derive(Debug, Args)]
struct CompleteArgs {
    /// Schema file: JSON, or YAML for .yaml/.yml extensions.
    #[arg(long)]
    schema: PathBuf,
    /// Cursor byte offset; defaults to the end of the line.
    #[arg(long)]
    cursor: Option<usize>,
    /// The partial input line to complete.
    line: String,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema file: JSON, or YAML for .yaml/.yml extensions.
    #[arg(long)]
    schema: PathBuf,
}

/// JSON view of a parsed line for scripting consumers.
#[derive(Debug, Serialize)]
struct ParseReport {
    command: String,
    options: Vec<OptionReport>,
    argument: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OptionReport {
    name: String,
    values: Vec<String>,
    properties: BTreeMap<String, String>,
    from_defaults: bool,
}

impl ParseReport {
    fn from_line(line: &CommandLine) -> Self {
        Self {
            command: line.command.clone(),
            options: line
                .values
                .options
                .iter()
                .map(|bound| OptionReport {
                    name: bound.display_name(),
                    values: bound.values.clone(),
                    properties: bound.properties.clone(),
                    from_defaults: bound.from_defaults,
                })
                .collect(),
            argument: line.values.argument.clone(),
            error: line.deferred.as_ref().map(|error| error.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    match cli.command {
        Command::Parse(args) => {
            let schema = load_schema(&args.schema)?;
            let parsed = if args.ignore_requirements {
                parse_line_lenient(&schema, &args.line)
            } else {
                parse_line(&schema, &args.line)
            };
            print_json(&ParseReport::from_line(&parsed))?;
            Ok(if parsed.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Complete(args) => {
            let schema = load_schema(&args.schema)?;
            let cursor = args.cursor.unwrap_or(args.line.len());
            let completions = complete_line(&schema, &args.line, cursor);
            print_json(&completions)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate(args) => {
            let schema = load_schema(&args.schema)?;
            let findings: Vec<String> = validate_command(&schema)
                .iter()
                .map(|error| error.to_string())
                .collect();
            print_json(&findings)?;
            Ok(if findings.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

fn load_schema(path: &Path) -> Result<CommandSpec, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&raw).map_err(|error| format!("invalid YAML schema: {error}"))
        }
        _ => serde_json::from_str(&raw).map_err(|error| format!("invalid JSON schema: {error}")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?;
    println!("{rendered}");
    Ok(())
}
