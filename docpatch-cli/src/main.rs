use clap::{Parser, Subcommand, ValueEnum};
use docpatch::{
    parse_patch_path, parse_patches_json, parse_patches_yaml, Document, DocumentPatch,
    EngineConfig, PatchEngine, PathStep,
};
use std::path::Path;
use std::process;

/// docpatch CLI - apply typed patch batches to content documents
#[derive(Parser)]
#[command(name = "docpatch", version, about)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a patch batch to a document and print the result
    Apply {
        /// Document file (.json, .yaml or .yml)
        #[arg(long)]
        document: String,
        /// Patch list file (.json, .yaml or .yml)
        #[arg(long)]
        patches: String,
        /// Engine config file (YAML)
        #[arg(long)]
        config: Option<String>,
        /// Fail without output if any patch is rejected
        #[arg(long)]
        atomic: bool,
    },

    /// Parse a patch path and print its steps
    CheckPath {
        /// Path string, e.g. sections[2].title
        path: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Apply {
            document,
            patches,
            config,
            atomic,
        } => {
            let engine = match config {
                Some(path) => PatchEngine::from_config_str(&read_file(&path)?)?,
                None => PatchEngine::new(EngineConfig::default()),
            };
            let doc = read_document(&document)?;
            let batch = read_patches(&patches)?;
            log::info!("Applying {} patches to {document}", batch.len());

            let result = engine.apply(&doc, &batch);
            if atomic && !result.is_ok() {
                let errors = serde_json::to_value(&result.errors)?;
                print_output(&serde_json::json!({ "errors": errors }), &cli.format)?;
                return Err(format!("{} of {} patches rejected", result.errors.len(), batch.len()).into());
            }
            print_output(&serde_json::to_value(&result)?, &cli.format)?;
        }

        Command::CheckPath { path } => {
            let parsed = parse_patch_path(&path)?;
            let steps: Vec<serde_json::Value> = parsed
                .steps()
                .iter()
                .map(|step| match step {
                    PathStep::Field(name) => serde_json::json!({ "field": name }),
                    PathStep::Index(index) => serde_json::json!({ "index": index }),
                })
                .collect();
            print_output(
                &serde_json::json!({ "path": parsed.to_string(), "steps": steps }),
                &cli.format,
            )?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn read_file(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}").into())
}

fn is_yaml(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read_document(path: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let content = read_file(path)?;
    let doc = if is_yaml(path) {
        Document::from_yaml_str(&content)?
    } else {
        Document::from_json_str(&content)?
    };
    Ok(doc)
}

fn read_patches(path: &str) -> Result<Vec<DocumentPatch>, Box<dyn std::error::Error>> {
    let content = read_file(path)?;
    let patches = if is_yaml(path) {
        parse_patches_yaml(&content)?
    } else {
        parse_patches_json(&content)?
    };
    Ok(patches)
}
