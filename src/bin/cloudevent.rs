//! cloudevent CLI - check and normalise CloudEvents JSON documents
//!
//! Reads one event per invocation, from a file or stdin, and decodes it with
//! any extension attributes collected into an ordered map.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use cloudevent_json::{CloudEventExt, CodecConfig, CodecRegistry, ExtensionMap};
use serde_json::Value;

type AnyEvent = CloudEventExt<Value, ExtensionMap<Value>>;

#[derive(Parser)]
#[command(name = "cloudevent")]
#[command(version, about = "Check and normalise CloudEvents JSON documents", long_about = None)]
struct Cli {
    /// YAML codec configuration (defaults to CLOUDEVENT_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an event and report whether it is valid
    Check {
        /// Input file, or - for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Decode an event and print it in canonical attribute order
    Normalize {
        /// Input file, or - for stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the extension attributes of an event
    Extensions {
        /// Input file, or - for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let result = load_config(cli.config).and_then(|config| match cli.command {
        Commands::Check { input } => check(config, input),
        Commands::Normalize { input, pretty } => normalize(config, input, pretty),
        Commands::Extensions { input } => extensions(config, input),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<CodecConfig, String> {
    match path {
        Some(path) => CodecConfig::load_from_file(&path).map_err(|e| e.to_string()),
        None => CodecConfig::from_env().map_err(|e| e.to_string()),
    }
}

fn registry(config: CodecConfig) -> CodecRegistry {
    let mut registry = CodecRegistry::with_config(config);
    registry.add_cloud_event_ext_to_json::<Value, ExtensionMap<Value>>();
    registry.add_cloud_event_ext_from_json::<Value, ExtensionMap<Value>>();
    registry
}

fn read_input(input: &Path) -> Result<String, String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| format!("Failed to read {}: {}", input.display(), e))
    }
}

fn decode(registry: &CodecRegistry, input: &Path) -> Result<AnyEvent, String> {
    let text = read_input(input)?;
    let event: AnyEvent = registry.from_json_str(&text).map_err(|e| e.to_string())?;
    tracing::info!("Decoded event {} of type {}", event.id(), event.event_type());
    Ok(event)
}

/// Decode an event and report its identity
fn check(config: CodecConfig, input: PathBuf) -> Result<(), String> {
    let registry = registry(config);
    let event = decode(&registry, &input)?;

    println!("{}", check_report(&event));
    Ok(())
}

fn check_report(event: &AnyEvent) -> String {
    format!(
        "valid: id={} type={} source={} extensions={}",
        event.id(),
        event.event_type(),
        event.source(),
        event.extension().len()
    )
}

/// Re-encode an event with the standard attributes first
fn normalize(mut config: CodecConfig, input: PathBuf, pretty: bool) -> Result<(), String> {
    config.pretty |= pretty;
    let registry = registry(config);
    let event = decode(&registry, &input)?;

    println!("{}", registry.to_json_string(&event).map_err(|e| e.to_string())?);
    Ok(())
}

/// Print one `name=value` line per extension attribute
fn extensions(config: CodecConfig, input: PathBuf) -> Result<(), String> {
    let registry = registry(config);
    let event = decode(&registry, &input)?;

    for line in extension_lines(&event) {
        println!("{}", line);
    }
    Ok(())
}

fn extension_lines(event: &AnyEvent) -> Vec<String> {
    event
        .extension()
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect()
}
