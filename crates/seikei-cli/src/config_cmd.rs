use crate::config::{Config, ConfigError, ConfigPaths, parse_kinds};
use clap::Args;
use std::process::Command;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print config with secrets redacted
    #[arg(long)]
    pub print: bool,

    /// Edit config in $EDITOR
    #[arg(long)]
    pub edit: bool,

    /// Set a config value (dotted key=value)
    #[arg(long, value_name = "key=value")]
    pub set: Vec<String>,
}

pub fn run(args: &ConfigArgs, paths: &ConfigPaths) -> Result<(), ConfigError> {
    if args.edit && (!args.set.is_empty() || args.print) {
        return Err(ConfigError::Validation(
            "--edit cannot be combined with --set or --print".into(),
        ));
    }

    let mut config = Config::load_or_create(paths)?;

    if args.edit {
        edit_config(paths)?;
        Config::load(paths)?.validate()?;
        return Ok(());
    }

    if !args.set.is_empty() {
        for assignment in &args.set {
            apply_set(&mut config, assignment)?;
        }
        config.validate()?;
        Config::write(paths, &config)?;
    }

    if args.print || args.set.is_empty() {
        let output = toml::to_string_pretty(&config.redacted())?;
        println!("{output}");
    }

    Ok(())
}

fn edit_config(paths: &ConfigPaths) -> Result<(), ConfigError> {
    let editor = std::env::var("EDITOR")
        .map_err(|_| ConfigError::Validation("$EDITOR not set; use --set or set EDITOR".into()))?;
    let words = split_words(&editor)?;
    let (program, rest) = words
        .split_first()
        .ok_or_else(|| ConfigError::Validation("$EDITOR is empty".into()))?;
    let status = Command::new(program)
        .args(rest)
        .arg(&paths.config_path)
        .status()?;
    if !status.success() {
        return Err(ConfigError::Validation(
            "editor exited with a non-zero status".into(),
        ));
    }
    Ok(())
}

/// Split an `$EDITOR` value into words, honoring quotes and backslashes.
fn split_words(value: &str) -> Result<Vec<String>, ConfigError> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(open), ch) if ch == open => quote = None,
            (None, '\'' | '"') => {
                quote = Some(ch);
                current.get_or_insert_with(String::new);
            }
            (Some('\''), ch) => current.get_or_insert_with(String::new).push(ch),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    current.get_or_insert_with(String::new).push(next);
                }
            }
            (None, ch) if ch.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            (_, ch) => current.get_or_insert_with(String::new).push(ch),
        }
    }

    if quote.is_some() {
        return Err(ConfigError::Validation(
            "$EDITOR has unmatched quotes".into(),
        ));
    }
    words.extend(current);
    Ok(words)
}

fn apply_set(config: &mut Config, assignment: &str) -> Result<(), ConfigError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation("expected key=value for --set".into()))?;
    let value = value.trim();
    match key.trim() {
        "llm.provider" => config.llm.provider = value.to_string(),
        "llm.model" => config.llm.model = value.to_string(),
        "llm.api_key" => config.llm.api_key = value.to_string(),
        "analysis.kinds" => {
            let kinds: Vec<&str> = value.split(',').collect();
            let parsed = parse_kinds(&kinds).map_err(ConfigError::Validation)?;
            config.analysis.kinds = parsed.iter().map(|kind| kind.as_str().to_string()).collect();
        }
        "analysis.temperature" => {
            config.analysis.temperature = value.parse().map_err(|_| {
                ConfigError::Validation(format!("analysis.temperature must be a number (got {value})"))
            })?;
        }
        "rules.path" => config.rules.path = value.to_string(),
        "reports.dir" => config.reports.dir = value.to_string(),
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown config key: {other}"
            )));
        }
    }
    Ok(())
}
