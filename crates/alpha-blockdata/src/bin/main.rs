use std::io::{self, Read as _};

use alpha_blockdata::{io::Cursor, Header, HeaderFormat, Network};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "alpha-header")]
#[command(about = "Decodes a hex-encoded Alpha block header and prints its derived views as JSON.", long_about = None)]
struct Args {
    /// Hex-encoded header. Read from stdin when omitted.
    pub header: Option<String>,

    /// Layout of the input header (legacy, extended).
    #[arg(short, long, default_value = "extended")]
    pub format: HeaderFormat,

    /// Use the specified network (mainnet, testnet, regtest).
    #[arg(short, long, default_value = "mainnet")]
    pub network: Network,

    /// Also encode the decoded header in the given layout.
    #[arg(long)]
    pub reencode: Option<HeaderFormat>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    pub no_color: bool,
}

/// What the inspector prints for one header.
#[derive(Serialize)]
struct Report {
    format: HeaderFormat,
    hash: String,
    is_null: bool,
    block_time: i64,
    header: Header,
    preimage: String,
    target: Option<String>,
    difficulty: Option<u128>,
    trailing_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    reencoded: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(&args)?;

    let input = match &args.header {
        Some(hex) => hex.clone(),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let bytes = hex::decode(input.trim())?;
    debug!(len = bytes.len(), format = %args.format, "Read header bytes");

    let mut cursor = Cursor::new(bytes.as_slice());
    let header = Header::consensus_decode_with(args.format, &mut cursor)?;

    let consumed = usize::try_from(cursor.position())?;
    let trailing_bytes = bytes.len().saturating_sub(consumed);
    if trailing_bytes > 0 {
        warn!(trailing_bytes, "Input continues past the end of the header");
    }

    let params = args.network.consensus_params();
    let hash = header.block_hash_with_params(&params);
    info!(%hash, network = %args.network, "Decoded header");

    let reencoded = match args.reencode {
        Some(format) => Some(hex::encode(header.serialize_with(format)?)),
        None => None,
    };

    let report = Report {
        format: args.format,
        hash: hash.to_string(),
        is_null: header.is_null(),
        block_time: header.block_time(),
        preimage: hex::encode(header.pow_preimage().to_bytes()),
        target: header.target().map(|target| hex::encode(target.to_be_bytes())),
        difficulty: header.difficulty(&params),
        trailing_bytes,
        reencoded,
        header,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'warn' as default.",
                args.log_level
            );
            tracing::Level::WARN
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(args.verbose)
            .with_thread_names(args.verbose)
            .with_ansi(use_ansi)
            .with_file(args.verbose)
            .with_line_number(args.verbose)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}
