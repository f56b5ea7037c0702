//! surgeguard core CLI.
//!
//! Replays recorded timestamp streams through the rate-spike detector and
//! inspects the configuration the detector would run with.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sg_common::{Error, OutputFormat, StructuredError, SCHEMA_VERSION};
use sg_config::{list_presets, load_config, ConfigOptions, ConfigOverrides, PresetName, ResolvedConfig};
use sg_core::exit_codes::ExitCode;
use sg_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use sg_core::{replay, Detector, JsonlSink, NullSink, ReplayError, ReplaySummary, SpikesOnly};
use tracing::{debug, info};

/// surgeguard - streaming rate-spike detection
#[derive(Parser)]
#[command(name = "sg-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Options shared by every command
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to detector.json (SURGEGUARD_CONFIG is used when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of a config file
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Override history capacity
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Override spike threshold
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Override admit-probability decay constant
    #[arg(long, global = true)]
    decay: Option<f64>,

    /// Override the time origin; the first timestamp must be greater
    #[arg(long, global = true)]
    origin: Option<u64>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a timestamp stream and emit observations
    Replay(ReplayArgs),

    /// Resolve and validate the configuration, then print it
    Check,

    /// List built-in presets
    Presets,

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Timestamp file, one integer per line (stdin when absent)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Where to write results (stdout when absent)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// What to write
    #[arg(long, short = 'f', default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_level = if cli.global.quiet {
        Some(LogLevel::Off)
    } else {
        LogLevel::from_verbosity(cli.global.verbose)
    };
    let log_config = LogConfig::from_env(log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Replay(args) => run_replay(&cli.global, args, log_config.format),
        Commands::Check => run_check(&cli.global, log_config.format),
        Commands::Presets => run_presets(),
        Commands::Version => {
            print_version();
            ExitCode::Clean
        }
    };

    debug!(exit_code = %exit_code, "exiting");
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Commands
// ============================================================================

fn run_replay(global: &GlobalOpts, args: &ReplayArgs, log_format: LogFormat) -> ExitCode {
    let resolved = match resolve(global) {
        Ok(resolved) => resolved,
        Err(err) => return report(&err, None, log_format),
    };
    let mut detector = match Detector::from_config(&resolved.config) {
        Ok(detector) => detector,
        Err(err) => return report(&err, None, log_format),
    };

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => return report(&Error::Io(err), None, log_format),
        },
        None => Box::new(std::io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(err) => return report(&Error::Io(err), None, log_format),
        },
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    info!(
        source = %resolved.source,
        format = %args.format,
        capacity = resolved.config.capacity,
        threshold = resolved.config.threshold,
        "replay started"
    );

    let result = match args.format {
        OutputFormat::Jsonl => replay(reader, &mut detector, JsonlSink::new(writer)),
        OutputFormat::Spikes => replay(reader, &mut detector, SpikesOnly::new(JsonlSink::new(writer))),
        OutputFormat::Summary => replay(reader, &mut detector, NullSink)
            .and_then(|summary| write_summary(writer, &summary).map(|_| summary)),
    };

    match result {
        Ok(summary) if summary.has_spikes() => ExitCode::SpikesDetected,
        Ok(_) => ExitCode::Clean,
        Err(err) => report(err.error(), err.line(), log_format),
    }
}

fn run_check(global: &GlobalOpts, log_format: LogFormat) -> ExitCode {
    let resolved = match resolve(global) {
        Ok(resolved) => resolved,
        Err(err) => return report(&err, None, log_format),
    };

    let output = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "status": "ok",
        "source": resolved.source.to_string(),
        "path": resolved.path.as_ref().map(|p| p.display().to_string()),
        "preset": resolved.preset.map(|p| p.as_str()),
        "config": resolved.config,
    });
    print_json(&output)
}

fn run_presets() -> ExitCode {
    print_json(&list_presets())
}

fn print_version() {
    println!("sg-core {}", env!("CARGO_PKG_VERSION"));
    println!("schema version: {}", SCHEMA_VERSION);
}

// ============================================================================
// Helpers
// ============================================================================

fn resolve(global: &GlobalOpts) -> Result<ResolvedConfig, Error> {
    if let Some(path) = &global.config {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
    }

    let options = ConfigOptions {
        config_path: global.config.clone(),
        preset: global.preset,
        overrides: ConfigOverrides {
            capacity: global.capacity,
            threshold: global.threshold,
            decay_constant: global.decay,
            origin: global.origin,
        },
    };
    load_config(&options).map_err(Error::from)
}

fn write_summary(mut writer: Box<dyn Write>, summary: &ReplaySummary) -> Result<(), ReplayError> {
    serde_json::to_writer(&mut writer, summary).map_err(Error::from)?;
    writer.write_all(b"\n").map_err(Error::from)?;
    writer.flush().map_err(Error::from)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(err) => {
            eprintln!("{}", Error::from(err).to_human());
            ExitCode::InternalError
        }
    }
}

/// Print an error on stderr in the active log format and pick the exit code.
fn report(err: &Error, line: Option<usize>, log_format: LogFormat) -> ExitCode {
    match log_format {
        LogFormat::Jsonl => {
            let mut structured = StructuredError::from(err);
            if let Some(line) = line {
                structured = structured.with_context("line", line);
            }
            eprintln!("{}", structured.to_json());
        }
        LogFormat::Human => {
            // malformed input already names its line in the message
            let names_line = matches!(err, Error::MalformedInput { .. });
            if let Some(line) = line.filter(|_| !names_line) {
                eprintln!("line {}:", line);
            }
            eprintln!("{}", err.to_human());
        }
    }
    ExitCode::for_error(err)
}
