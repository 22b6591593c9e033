//! Transform Config CLI
//!
//! Inspect the engine configuration and run JSON documents through the
//! serializer with it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use familiar_transform::{
    JsonSerializer, OutputFormat, ParseOptions, SchemaRegistry, SerializeOptions, TransformConfig,
    Value,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "transform-config")]
#[command(about = "Inspect transform engine settings and reformat JSON with them")]
struct Cli {
    /// Config file to load instead of the search path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective parse and serialize options
    Show {
        #[arg(long, value_enum, default_value = "text")]
        format: ShowFormat,
    },

    /// Write the default configuration to a file
    Init {
        #[arg(short, long, default_value = "transform.toml")]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check the loaded configuration for bad values
    Validate,

    /// Re-emit a JSON document under the configured output format and depth limit
    Format {
        input: PathBuf,

        /// Override the configured output format
        #[arg(long, value_enum)]
        output_format: Option<CliOutputFormat>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShowFormat {
    Text,
    Toml,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Pretty,
    Compact,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Pretty => OutputFormat::Pretty,
            CliOutputFormat::Compact => OutputFormat::Compact,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = TransformConfig::load_from(cli.config.as_deref())?;
    debug!(config = ?cli.config, "Loaded configuration");

    match cli.command {
        Commands::Show { format } => show(&cfg, format)?,
        Commands::Init { output, force } => init(&output, force)?,
        Commands::Validate => {
            let problems = cfg.validate();
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("❌ {}", problem);
                }
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
        }
        Commands::Format {
            input,
            output_format,
        } => {
            let format = output_format.map(OutputFormat::from).unwrap_or(cfg.serialize.output_format);
            println!("{}", reformat(&cfg, &input, format)?);
        }
    }

    Ok(())
}

fn show(cfg: &TransformConfig, format: ShowFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(cfg)?),
        ShowFormat::Toml => println!("{}", ::toml::to_string_pretty(cfg)?),
        ShowFormat::Text => {
            let parse = ParseOptions::from_config(cfg);
            let serialize = SerializeOptions::from_config(cfg);

            println!("📋 Transform Configuration\n");
            println!("Parse:");
            println!("  View: {}", parse.view);
            let unknown_keys = match (parse.strict_unknown_keys, parse.strict_aggregate_keys) {
                (_, true) => "reject, report all",
                (true, false) => "reject, report first",
                (false, false) => "ignore",
            };
            println!("  Unknown keys: {}", unknown_keys);
            println!("  Max depth: {}", parse.max_depth);

            println!("\nSerialize:");
            println!("  View: {}", serialize.view);
            println!("  Pretty: {}", serialize.pretty);
            println!("  Max depth: {}", serialize.max_depth);
        }
    }
    Ok(())
}

fn init(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!("{} already exists, pass --force to replace it", output.display()).into());
    }
    TransformConfig::default().save(output)?;
    println!("✅ Created config file: {}", output.display());
    Ok(())
}

/// Documents carry no type, so the serializer copies them as plain values;
/// the depth limit and output format still come from the configuration.
fn reformat(
    cfg: &TransformConfig,
    input: &Path,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let tree: JsonValue = serde_json::from_str(&text)?;
    info!(input = %input.display(), ?format, "Reformatting document");

    let options = SerializeOptions::from_config(cfg).with_pretty(format == OutputFormat::Pretty);
    let out = JsonSerializer::with_options(SchemaRegistry::global(), options)
        .serialize(&Value::from_json(&tree))?;
    Ok(out)
}
