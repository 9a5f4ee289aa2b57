use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use bqschema_plugin::generate_from_bytes;
use clap::Parser;
use prost::Message;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// protoc plugin: reads a CodeGeneratorRequest on stdin and writes BigQuery
/// table schemas for annotated messages as a CodeGeneratorResponse on stdout.
#[derive(Parser)]
#[command(name = "protoc-gen-bq-schema", version, about)]
struct Cli {
    /// Read the serialized request from a file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write the serialized response to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (logs go to stderr)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let request = match &cli.input {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    debug!(bytes = request.len(), "read code generation request");

    let response = generate_from_bytes(&request)?;
    let encoded = response.encode_to_vec();
    match cli.output {
        Some(path) => fs::write(&path, encoded)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&encoded)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
