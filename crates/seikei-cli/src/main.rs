mod config;
mod config_cmd;
mod input;
mod render;
mod report;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigPaths, LlmConfig, parse_kinds};
use input::InputArgs;
use seikei_core::compare::{CompareOptions, Comparison, compare};
use seikei_core::complete::{CompletionProvider, create_completion_provider};
use seikei_core::diff::{render_html_diff, tokenize};
use seikei_core::extract_corrections;
use seikei_core::replace::RuleSet;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LABEL_BEFORE: &str = "整形前";
const LABEL_AFTER: &str = "整形後";

#[derive(Parser)]
#[command(
    name = "seikei",
    version,
    about = "transcript cleanup and before/after AI output comparison"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean a transcript and compare model output before and after
    Compare(CompareArgs),
    /// Clean a transcript and print the correction log
    Clean(CleanArgs),
    /// Render a side-by-side HTML diff of the cleanup
    Diff(DiffArgs),
    /// List the active replacement rules in application order
    Rules(RulesArgs),
    Config(config_cmd::ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct RulesArgs {
    /// Replacement rules file (TOML [[rules]] with find/replace)
    #[arg(long, value_name = "path")]
    rules: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CompareArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    rules: RulesArgs,

    /// Analyses to request (summary, tags, outline)
    #[arg(long, value_delimiter = ',', value_name = "kind,...")]
    kinds: Option<Vec<String>>,

    /// Language model provider: openai or ollama
    #[arg(long)]
    provider: Option<String>,

    /// Model override for the selected provider
    #[arg(long)]
    model: Option<String>,

    /// Skip language model calls
    #[arg(long)]
    no_llm: bool,

    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,

    /// Write the HTML diff to this path
    #[arg(long, value_name = "path")]
    html_out: Option<PathBuf>,

    /// Save the comparison under the reports directory
    #[arg(long)]
    save: bool,
}

#[derive(Args, Debug, Clone)]
struct CleanArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    rules: RulesArgs,

    /// Print cleaned text and corrections as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DiffArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    rules: RulesArgs,

    /// Output path (default: stdout)
    #[arg(long, short = 'o', value_name = "path")]
    output: Option<PathBuf>,

    /// Label for the original column
    #[arg(long, default_value = LABEL_BEFORE)]
    label_a: String,

    /// Label for the cleaned column
    #[arg(long, default_value = LABEL_AFTER)]
    label_b: String,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn apply_env_overrides(llm: &mut LlmConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(value) = env("SEIKEI_LLM_PROVIDER") {
        llm.provider = value;
    }
    if let Some(value) = env("SEIKEI_LLM_MODEL") {
        llm.model = value;
    }
    if let Some(value) = env("SEIKEI_LLM_API_KEY") {
        llm.api_key = value;
    }
}

/// Config, then environment, then command-line flags. `OPENAI_API_KEY` fills
/// a missing key once the final provider is known.
fn resolve_llm(
    config: &Config,
    args: &CompareArgs,
    env: impl Fn(&str) -> Option<String>,
) -> LlmConfig {
    let mut llm = config.llm.clone();
    apply_env_overrides(&mut llm, &env);
    if let Some(provider) = &args.provider {
        if *provider != llm.provider {
            llm.model = String::new();
        }
        llm.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }
    if llm.api_key.trim().is_empty()
        && llm.provider == "openai"
        && let Some(value) = env("OPENAI_API_KEY")
    {
        llm.api_key = value;
    }
    llm
}

fn non_empty_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn load_rules(args: &RulesArgs, config: &Config) -> Result<RuleSet, Box<dyn Error>> {
    let rules = match &args.rules {
        Some(path) => RuleSet::load(path)?,
        None => config.rule_set()?,
    };
    Ok(rules)
}

fn write_output(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn run_compare(
    args: &CompareArgs,
    config: &Config,
    paths: &ConfigPaths,
) -> Result<(), Box<dyn Error>> {
    let text = args.input.read()?;
    let rules = load_rules(&args.rules, config)?;
    let kinds = match &args.kinds {
        Some(values) => parse_kinds(values)?,
        None => config.analysis_kinds()?,
    };
    let options = CompareOptions {
        kinds,
        temperature: config.analysis.temperature,
    };

    let mut provider: Option<Box<dyn CompletionProvider>> = None;
    if !args.no_llm && !options.kinds.is_empty() {
        let llm = resolve_llm(config, args, env_override);
        match create_completion_provider(
            &llm.provider,
            non_empty_str(&llm.model),
            non_empty_str(&llm.api_key),
        ) {
            Ok(created) => provider = Some(created),
            Err(err) => eprintln!("language model unavailable ({err}); showing cleanup only"),
        }
    }

    let comparison = compare(
        &text,
        rules.rules(),
        provider.as_deref_mut().map(|p| p as &mut dyn CompletionProvider),
        &options,
    );
    for (kind, message) in comparison.failures() {
        eprintln!("warning: {kind} request failed: {message}");
    }

    let html = needs_html(args).then(|| comparison.render_html_diff(LABEL_BEFORE, LABEL_AFTER));
    if let (Some(path), Some(html)) = (&args.html_out, &html) {
        write_output(path, html)?;
        eprintln!("diff written to {}", path.display());
    }
    if args.save {
        save_report(&comparison, provider.as_deref(), &rules, config, paths, html.as_deref())?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", render::comparison(&comparison));
    }
    Ok(())
}

fn needs_html(args: &CompareArgs) -> bool {
    args.html_out.is_some() || args.save
}

fn save_report(
    comparison: &Comparison,
    provider: Option<&dyn CompletionProvider>,
    rules: &RuleSet,
    config: &Config,
    paths: &ConfigPaths,
    html: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let identity = provider.map(|p| (p.name(), p.model()));
    let metadata = report::ReportMetadata::new(comparison, identity, rules.len())?;
    let html = match html {
        Some(html) => html.to_string(),
        None => comparison.render_html_diff(LABEL_BEFORE, LABEL_AFTER),
    };
    let dir = report::save(&config.reports_dir(paths), &metadata, comparison, &html)?;
    eprintln!("report saved to {}", dir.display());
    Ok(())
}

fn run_clean(args: &CleanArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let text = args.input.read()?;
    let rules = load_rules(&args.rules, config)?;
    let cleaned = rules.apply(&text);
    let corrections = extract_corrections(&text, &cleaned);

    if args.json {
        let output = serde_json::json!({
            "cleaned": cleaned,
            "corrections": corrections,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{cleaned}\n");
        print!("{}", render::corrections_table(&corrections));
    }
    Ok(())
}

fn run_diff(args: &DiffArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let text = args.input.read()?;
    let rules = load_rules(&args.rules, config)?;
    let cleaned = rules.apply(&text);
    let html = render_html_diff(
        &tokenize(&text),
        &tokenize(&cleaned),
        &args.label_a,
        &args.label_b,
    );
    match &args.output {
        Some(path) => {
            write_output(path, &html)?;
            eprintln!("diff written to {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn run_rules(args: &RulesArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let rules = load_rules(args, config)?;
    print!("{}", render::rules(&rules));
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = match ConfigPaths::from_env() {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("config paths error: {err}");
            std::process::exit(1);
        }
    };

    if let Command::Config(args) = &cli.command {
        if let Err(e) = config_cmd::run(args, &paths) {
            eprintln!("config failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    let config = match Config::load_or_create(&paths) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config load failed: {err}");
            std::process::exit(1);
        }
    };

    let (label, result) = match &cli.command {
        Command::Compare(args) => ("compare", run_compare(args, &config, &paths)),
        Command::Clean(args) => ("clean", run_clean(args, &config)),
        Command::Diff(args) => ("diff", run_diff(args, &config)),
        Command::Rules(args) => ("rules", run_rules(args, &config)),
        Command::Config(_) => return,
    };
    if let Err(e) = result {
        eprintln!("{label} failed: {e}");
        std::process::exit(1);
    }
}
