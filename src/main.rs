use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cyphergen::config::{CliConfig, TranslatorConfig};
use cyphergen::cypher_generator::translate;
use cyphergen::graph_catalog::{GraphSchema, GraphSchemaConfig};
use cyphergen::query_context::ResolutionContext;

/// Cyphergen - translate a resolved GraphQL operation into Cypher
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema metadata YAML file
    #[arg(long)]
    schema: PathBuf,

    /// Resolution context JSON file (one operation field)
    #[arg(long)]
    request: PathBuf,

    /// Translator configuration YAML file (environment is used otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prefix stripped from count field names
    #[arg(long)]
    count_prefix: Option<String>,

    /// Enforce declared auth scopes
    #[arg(long)]
    auth_scopes: bool,

    /// Pretty-print the statement plan
    #[arg(long)]
    pretty: bool,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            count_prefix: cli.count_prefix.clone(),
            auth_scopes: cli.auth_scopes,
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => TranslatorConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TranslatorConfig::from_env().context("reading config from environment")?,
    };
    config.merge_cli(&CliConfig::from(cli))?;

    let schema: Arc<GraphSchema> = Arc::new(
        GraphSchemaConfig::from_yaml_file(&cli.schema)
            .and_then(|c| c.to_graph_schema())
            .with_context(|| format!("loading schema {}", cli.schema.display()))?,
    );

    let request = std::fs::read_to_string(&cli.request)
        .with_context(|| format!("reading request {}", cli.request.display()))?;
    let ctx: ResolutionContext =
        serde_json::from_str(&request).context("parsing resolution context")?;

    let plan = translate(&ctx, &schema, &config)?;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string(&plan)?
    };
    println!("{}", output);
    Ok(())
}
