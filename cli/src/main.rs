use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use form_schema_core::{FormKey, FormRegistry, InstanceBinder};
use form_schema_source::{DefinitionSet, JsonBindingSource};

/// Output format for bound instance trees.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "form-schema")]
#[command(about = "Validate form schemas and bind them against JSON data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate every form in the given schema documents.
    Validate(ValidateArgs),
    /// Bind a form against a JSON data document and print the instance tree.
    Bind(BindArgs),
    /// List the form keys found in the given schema documents.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema document files or directories.
    #[arg(required = true)]
    schemas: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BindArgs {
    /// Key of the form to bind, as `[@][group:]id`.
    #[arg(long)]
    form: String,
    /// JSON data document to bind against.
    #[arg(long)]
    data: PathBuf,
    /// Output format for the instance tree.
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
    /// Schema document files or directories.
    #[arg(required = true)]
    schemas: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Schema document files or directories.
    #[arg(required = true)]
    schemas: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Bind(args) => run_bind(args),
        Command::List(args) => run_list(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_registry(schemas: &[PathBuf]) -> Result<FormRegistry, String> {
    let set = DefinitionSet::from_paths(schemas).map_err(|e| e.to_string())?;
    set.into_registry().map_err(|e| e.to_string())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let set = DefinitionSet::from_paths(&args.schemas).map_err(|e| e.to_string())?;
    let origin = set.source().to_string();
    let registry = set.into_registry().map_err(|e| e.to_string())?;
    registry.validate_all(&[]).map_err(|e| e.to_string())?;
    println!("Validated {} form(s) from {origin}.", registry.len());
    Ok(())
}

fn run_bind(args: BindArgs) -> Result<(), String> {
    let key: FormKey = args.form.parse().map_err(|e| format!("{e}"))?;
    let registry = load_registry(&args.schemas)?;
    registry.validate_all(&[]).map_err(|e| e.to_string())?;

    let file = File::open(&args.data)
        .map_err(|err| format!("Failed to open '{}': {err}", args.data.display()))?;
    let source = JsonBindingSource::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse '{}': {err}", args.data.display()))?;

    let binder = InstanceBinder::new(&registry, &source);
    let instance = binder.bind_form(&key).map_err(|e| e.to_string())?;

    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&instance)
            .map_err(|err| format!("Failed to serialize instance: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&instance)
            .map_err(|err| format!("Failed to serialize instance: {err}"))?,
    };
    println!("{rendered}");
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let registry = load_registry(&args.schemas)?;
    let mut keys: Vec<FormKey> = registry.forms().map(|form| form.key()).collect();
    keys.sort();
    for key in keys {
        println!("{key}");
    }
    Ok(())
}
