use std::path::PathBuf;

use actionform_engine::{FormDocument, parse_form_document};
use actionform_util::{CliConfig, expand_tilde};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let config = CliConfig::load().unwrap_or_else(|error| {
        warn!(error = %error, "Failed to load config; using defaults");
        CliConfig::default()
    });
    let matches = build_cli().get_matches();
    run(&matches, &config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    let file_arg = Arg::new("file")
        .long("file")
        .short('f')
        .action(ArgAction::Set)
        .help("Path to a form document (YAML or JSON)");

    Command::new("actionform")
        .about("Resolve, reconcile, and preview action form parameters")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parameters")
                .about("Print resolved UI parameters")
                .arg(file_arg.clone()),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Print form settings with defaults added for new parameters")
                .arg(file_arg.clone()),
        )
        .subcommand(
            Command::new("preview")
                .about("Print visible form fields in display order")
                .arg(file_arg.clone()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate parameter values against form settings")
                .arg(file_arg)
                .arg(
                    Arg::new("value")
                        .long("value")
                        .action(ArgAction::Append)
                        .value_name("ID=VALUE")
                        .help("Override a parameter value; VALUE is parsed as JSON when possible"),
                ),
        )
}

fn run(matches: &ArgMatches, config: &CliConfig) -> Result<()> {
    let (command_name, sub_matches) = matches.subcommand().context("expected a subcommand")?;
    let path = document_path(sub_matches, config)?;
    debug!(path = %path.display(), command = command_name, "loading form document");
    let document = parse_form_document(&path)?;

    match command_name {
        "parameters" => emit(&document.ui_parameters(), config.pretty),
        "reconcile" => emit(document.editor_session().settings(), config.pretty),
        "preview" => emit(&document.editor_session().form_fields(), config.pretty),
        "validate" => validate(&document, sub_matches, config.pretty),
        other => anyhow::bail!("unknown subcommand: {}", other),
    }
}

fn validate(document: &FormDocument, matches: &ArgMatches, pretty: bool) -> Result<()> {
    let mut values = document.parameter_values.clone();
    for raw in matches.get_many::<String>("value").into_iter().flatten() {
        let (id, value) = parse_value_override(raw)?;
        values.insert(id, value);
    }

    let errors = document.editor_session().validate_values(&values);
    emit(&errors, pretty)?;
    if !errors.is_empty() {
        anyhow::bail!("{} field(s) failed validation", errors.len());
    }
    Ok(())
}

fn document_path(matches: &ArgMatches, config: &CliConfig) -> Result<PathBuf> {
    if let Some(file) = matches.get_one::<String>("file") {
        return Ok(expand_tilde(file));
    }
    config
        .default_document_path()
        .context("no form document given; pass --file or set default_document in the config file")
}

/// Splits `id=value`, reading the value as JSON and falling back to a plain string.
fn parse_value_override(raw: &str) -> Result<(String, Value)> {
    let (id, value) = raw
        .split_once('=')
        .with_context(|| format!("expected ID=VALUE, got '{}'", raw))?;
    let id = id.trim();
    anyhow::ensure!(!id.is_empty(), "parameter id is empty in '{}'", raw);
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((id.to_string(), value))
}

fn emit<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_overrides_parse_json_then_text() {
        assert_eq!(parse_value_override("qty=3").unwrap(), ("qty".to_string(), json!(3)));
        assert_eq!(parse_value_override("note=hello world").unwrap(), ("note".to_string(), json!("hello world")));
        assert_eq!(parse_value_override("flag=true").unwrap(), ("flag".to_string(), json!(true)));
        assert!(parse_value_override("missing-separator").is_err());
        assert!(parse_value_override("=3").is_err());
    }

    #[test]
    fn file_flag_takes_precedence_over_config() {
        let config = CliConfig {
            default_document: Some("/srv/default.yaml".to_string()),
            pretty: true,
        };
        let matches = build_cli().get_matches_from(["actionform", "preview", "--file", "/tmp/form.yaml"]);
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(document_path(sub_matches, &config).unwrap(), PathBuf::from("/tmp/form.yaml"));

        let matches = build_cli().get_matches_from(["actionform", "preview"]);
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(document_path(sub_matches, &config).unwrap(), PathBuf::from("/srv/default.yaml"));
    }

    #[test]
    fn missing_document_is_an_error() {
        let matches = build_cli().get_matches_from(["actionform", "parameters"]);
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert!(document_path(sub_matches, &CliConfig::default()).is_err());
    }

    #[test]
    fn validate_accepts_repeated_value_overrides() {
        let matches = build_cli().get_matches_from(["actionform", "validate", "-f", "form.yaml", "--value", "a=1", "--value", "b=x"]);
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "validate");
        let values: Vec<_> = sub_matches.get_many::<String>("value").unwrap().collect();
        assert_eq!(values, vec!["a=1", "b=x"]);
    }
}
