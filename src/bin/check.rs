//! Type Definition Checker CLI
//!
//! Compiles a directory of JSON type definitions and reports diagnostics.

use anyhow::{Context, Result};
use clap::Parser;
use jsonotron::{CompilerConfig, Severity, TypeCompiler, TypeDefinitionStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "jsonotron-check")]
#[command(about = "Compile type definitions and report errors")]
struct Cli {
    /// Directory containing *.json type definitions
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the schema domain
    #[arg(long)]
    domain: Option<String>,

    /// Treat warnings as failures
    #[arg(long)]
    strict: bool,

    /// Print the type map as JSON
    #[arg(long)]
    type_map: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = CompilerConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(domain) = cli.domain {
        config.domain = domain;
    }

    let store = load_definitions(&cli.dir)?;
    println!("🔍 Compiling {} definition(s) from {}", store.len(), cli.dir.display());

    let compiled = TypeCompiler::new(config).compile(&store);
    let result = compiled.result();

    for diagnostic in result.errors().iter().chain(result.warnings()) {
        let marker = match diagnostic.severity() {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
        };
        println!("{} {}", marker, diagnostic);
    }

    if cli.type_map {
        println!("{}", serde_json::to_string_pretty(&compiled.type_map())?);
    }

    let passed = if cli.strict {
        result.is_successful_with_no_warnings()
    } else {
        result.is_successful()
    };

    println!(
        "{} {} error(s), {} warning(s)",
        if passed { "✅" } else { "❌" },
        result.errors().len(),
        result.warnings().len()
    );
    Ok(passed)
}

fn load_definitions(dir: &Path) -> Result<TypeDefinitionStore> {
    let mut store = TypeDefinitionStore::new();

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        store.add_with_source(value, path.display().to_string());
    }

    Ok(store)
}
