//! blobpipe CLI - Command line interface for blobpipe
//!
//! Reads and writes records in a blob store, resolves storage notifications
//! and exposes the codec and ranking helpers for shell pipelines. Results go
//! to stdout as JSON; failures go to stderr as a single diagnostic line.

use blobpipe::{
    top_k, BackendConfig, Codec, Compression, DiagnosticSink, ObjectStore, StderrSink,
    StoreConfig,
};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "blobpipe")]
#[command(about = "Compressed JSON persistence for event-driven functions")]
#[command(version)]
struct Cli {
    /// Local directory used as the blob store (overrides BLOBPIPE_ROOT)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// S3-compatible endpoint (overrides BLOBPIPE_ENDPOINT and --root)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    // === Store Commands ===
    /// Fetch a blob
    Get {
        bucket: String,
        key: String,
        /// Decode a compressed payload before printing
        #[arg(short, long)]
        decompress: bool,
    },

    /// Store a JSON document read from a file or stdin
    Put {
        bucket: String,
        key: String,
        /// Store as a compressed, base64 encoded payload
        #[arg(short, long)]
        compress: bool,
        /// Read the document from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    // === Event Commands ===
    /// Print the key referenced by a storage notification
    Key {
        /// Notification file (stdin when omitted)
        event: Option<PathBuf>,
    },

    /// Fetch the blob referenced by a storage notification
    Fetch {
        bucket: String,
        /// Notification file (stdin when omitted)
        event: Option<PathBuf>,
        /// Decode a compressed payload before printing
        #[arg(short, long)]
        decompress: bool,
    },

    // === Codec Commands ===
    /// Encode a JSON document into a compressed payload
    Encode {
        /// Use gzip instead of zlib
        #[arg(long)]
        gzip: bool,
        /// Read the document from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Decode a compressed payload back into JSON
    Decode {
        /// Payload is gzip rather than zlib
        #[arg(long)]
        gzip: bool,
        /// Read the payload from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    // === Ranking Commands ===
    /// Rank a JSON object of counts
    Top {
        /// Keep at most this many entries (0 keeps all)
        #[arg(short, long, default_value = "0")]
        limit: i64,
        /// Largest counts first
        #[arg(short, long)]
        descending: bool,
        /// Read the counts from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobpipe=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        StderrSink.emit(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Get {
            bucket,
            key,
            decompress,
        } => {
            let store = open_store(&cli)?;
            let body = store.get(bucket, key, *decompress)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "bucket": bucket,
                    "key": key,
                    "body": body_value(&body)
                }),
            )?;
        }

        Commands::Put {
            bucket,
            key,
            compress,
            file,
        } => {
            let store = open_store(&cli)?;
            let value: serde_json::Value = serde_json::from_slice(&read_input(file.as_deref())?)?;
            store.put(bucket, key, &value, *compress)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "bucket": bucket,
                    "key": key,
                    "compressed": compress
                }),
            )?;
        }

        Commands::Key { event } => {
            let key = blobpipe::resolve_key(&read_input(event.as_deref())?)?;
            output(&cli.format, &serde_json::json!({ "key": key }))?;
        }

        Commands::Fetch {
            bucket,
            event,
            decompress,
        } => {
            let store = open_store(&cli)?;
            let event = read_input(event.as_deref())?;
            let (body, key) = blobpipe::resolve_body(&store, &event, bucket, *decompress)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "bucket": bucket,
                    "key": key,
                    "body": body_value(&body)
                }),
            )?;
        }

        Commands::Encode { gzip, file } => {
            let value: serde_json::Value = serde_json::from_slice(&read_input(file.as_deref())?)?;
            let payload = codec(*gzip).encode(&value)?;
            output(&cli.format, &serde_json::json!({ "payload": payload }))?;
        }

        Commands::Decode { gzip, file } => {
            let value: serde_json::Value = codec(*gzip).decode_json(read_input(file.as_deref())?)?;
            output(&cli.format, &serde_json::json!({ "value": value }))?;
        }

        Commands::Top {
            limit,
            descending,
            file,
        } => {
            let counts: HashMap<String, i64> =
                serde_json::from_slice(&read_input(file.as_deref())?)?;
            let entries = top_k(&counts, *limit, *descending);
            output(
                &cli.format,
                &serde_json::json!({
                    "count": entries.len(),
                    "entries": entries
                }),
            )?;
        }
    }

    Ok(())
}

fn open_store(cli: &Cli) -> anyhow::Result<ObjectStore> {
    let mut config = StoreConfig::from_env()?;

    if let Some(endpoint) = &cli.endpoint {
        config.backend = BackendConfig::Http {
            endpoint: endpoint.clone(),
        };
    } else if let Some(root) = &cli.root {
        config.backend = BackendConfig::Local { root: root.clone() };
    }

    Ok(config.open()?)
}

fn codec(gzip: bool) -> Codec {
    if gzip {
        Codec::new(Compression::Gzip)
    } else {
        Codec::new(Compression::Zlib)
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut input = Vec::new();
            std::io::stdin().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}

/// JSON bodies are embedded as values, anything else as text
fn body_value(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn output(format: &OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value)?);
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}
