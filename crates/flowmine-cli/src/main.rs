// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use flowmine_conform::{check, ConformanceOptions};
use flowmine_core::canonical::stable_json_bytes;
use flowmine_core::{ExitCode, MachineError};
use flowmine_discover::{discover, flow_graph, DiscoveryOptions};
use flowmine_ingest::{
    log_statistics, normalize_with_log, DataSufficiencyPolicy, NormalizeEvent, NormalizedLog,
    RawEvent,
};
use flowmine_model::{DiscoveredModel, Timestamp};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode as ProcessExitCode;

#[derive(Parser)]
#[command(name = "flowmine")]
#[command(about = "Flowmine process mining CLI")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover a process model from an event log.
    Discover {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, default_value_t = DataSufficiencyPolicy::default().min_valid_events)]
        min_events: usize,
        #[arg(long, default_value_t = DataSufficiencyPolicy::default().min_traces)]
        min_traces: usize,
        /// Discovery timestamp in epoch milliseconds; defaults to now.
        /// Pinning it makes repeated runs byte-identical.
        #[arg(long)]
        discovered_at: Option<i64>,
    },
    /// Replay an event log against a discovered model.
    Conform {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        model: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        threshold: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Throughput and rework figures for an event log.
    Stats {
        #[arg(long)]
        events: PathBuf,
    },
}

struct Failure {
    exit: ExitCode,
    error: MachineError,
}

impl Failure {
    fn usage(code: &str, message: &str) -> Self {
        Self {
            exit: ExitCode::Usage,
            error: MachineError::new(code, message),
        }
    }

    fn validation(code: &str, message: &str) -> Self {
        Self {
            exit: ExitCode::Validation,
            error: MachineError::new(code, message),
        }
    }

    fn io(path: &Path, err: &std::io::Error) -> Self {
        Self {
            exit: ExitCode::DependencyFailure,
            error: MachineError::new("io_error", &err.to_string())
                .with_detail("path", &path.display().to_string()),
        }
    }

    fn internal(code: &str, message: &str) -> Self {
        Self {
            exit: ExitCode::Internal,
            error: MachineError::new(code, message),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.error = self.error.with_detail(key, value);
        self
    }
}

fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(failure) => {
            if cli.json {
                let rendered = serde_json::to_string(&failure.error)
                    .unwrap_or_else(|_| failure.error.to_string());
                eprintln!("{rendered}");
            } else {
                eprintln!("{}", failure.error);
            }
            ProcessExitCode::from(failure.exit as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    match &cli.command {
        Commands::Discover {
            events,
            out,
            graph,
            min_events,
            min_traces,
            discovered_at,
        } => run_discover(
            cli,
            events,
            out.as_deref(),
            graph.as_deref(),
            DataSufficiencyPolicy {
                min_valid_events: *min_events,
                min_traces: *min_traces,
            },
            *discovered_at,
        ),
        Commands::Conform {
            events,
            model,
            threshold,
            out,
        } => run_conform(cli, events, model, *threshold, out.as_deref()),
        Commands::Stats { events } => run_stats(cli, events),
    }
}

fn run_discover(
    cli: &Cli,
    events: &Path,
    out: Option<&Path>,
    graph: Option<&Path>,
    policy: DataSufficiencyPolicy,
    discovered_at: Option<i64>,
) -> Result<(), Failure> {
    let log = load_log(cli, events)?;
    policy.evaluate(&log).map_err(|err| {
        Failure::validation("insufficient_data", &err.to_string())
            .with_detail("valid_events", &err.valid_events.to_string())
            .with_detail("traces", &err.traces.to_string())
    })?;

    let discovered_at =
        Timestamp::from_millis(discovered_at.unwrap_or_else(|| chrono::Utc::now().timestamp_millis()));
    let model = discover(log.traces(), &DiscoveryOptions::at(discovered_at))
        .map_err(|err| Failure::internal("discovery_failed", &err.to_string()))?;

    if let Some(graph_path) = graph {
        let rendered = flow_graph(log.traces());
        write_artifact(cli, graph_path, &rendered)?;
    }
    emit(cli, out, &model)
}

fn run_conform(
    cli: &Cli,
    events: &Path,
    model_path: &Path,
    threshold: f64,
    out: Option<&Path>,
) -> Result<(), Failure> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Failure::usage(
            "invalid_threshold",
            "--threshold must be within [0.0, 1.0]",
        ));
    }

    let model = load_model(model_path)?;
    let log = load_log(cli, events)?;
    let report = check(
        log.traces(),
        &model,
        &ConformanceOptions::with_threshold(threshold),
    );
    emit(cli, out, &report)
}

fn run_stats(cli: &Cli, events: &Path) -> Result<(), Failure> {
    let log = load_log(cli, events)?;
    let stats = log_statistics(&log);

    if cli.json {
        let dropped: serde_json::Map<String, serde_json::Value> = log
            .dropped_by_reason()
            .into_iter()
            .map(|(reason, count)| (reason.as_str().to_string(), json!(count)))
            .collect();
        return emit(cli, None, &json!({ "statistics": stats, "dropped": dropped }));
    }

    println!("cases={}", stats.total_cases);
    println!("events={}", stats.total_events);
    println!("avg_cycle_time_hours={:.2}", stats.avg_cycle_time_hours);
    println!("rework_rate_percent={:.2}", stats.rework_rate_percent);
    println!("throughput={}", stats.throughput);
    println!("dropped={}", log.dropped_count());
    Ok(())
}

fn load_log(cli: &Cli, events: &Path) -> Result<NormalizedLog, Failure> {
    let raw = fs::read_to_string(events).map_err(|err| Failure::io(events, &err))?;
    let records: Vec<RawEvent> = serde_json::from_str(&raw).map_err(|err| {
        Failure::validation("invalid_events", &err.to_string())
            .with_detail("path", &events.display().to_string())
    })?;

    let (log, stage_events) = normalize_with_log(&records);
    if !cli.quiet && !cli.json {
        render_stage_log(&stage_events);
    }
    Ok(log)
}

fn load_model(path: &Path) -> Result<DiscoveredModel, Failure> {
    let raw = fs::read_to_string(path).map_err(|err| Failure::io(path, &err))?;
    let model: DiscoveredModel = serde_json::from_str(&raw).map_err(|err| {
        Failure::validation("invalid_model", &err.to_string())
            .with_detail("path", &path.display().to_string())
    })?;
    model.validate().map_err(|err| {
        Failure::validation("invalid_model", &err.to_string())
            .with_detail("path", &path.display().to_string())
    })?;
    Ok(model)
}

fn render_stage_log(stage_events: &[NormalizeEvent]) {
    for event in stage_events {
        let mut line = format!("stage={} event={}", event.stage.as_str(), event.name);
        for (key, value) in &event.fields {
            line.push_str(&format!(" {key}={value}"));
        }
        eprintln!("{line}");
    }
}

/// Payloads go through canonical bytes so repeated runs over identical
/// input are byte-identical on every surface.
fn emit<T: Serialize>(cli: &Cli, out: Option<&Path>, value: &T) -> Result<(), Failure> {
    if let Some(path) = out {
        write_artifact(cli, path, value)?;
        return Ok(());
    }
    if cli.json {
        let bytes = canonical_bytes(value)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&bytes)
            .and_then(|()| stdout.write_all(b"\n"))
            .map_err(|err| Failure::internal("stdout_write_failed", &err.to_string()))?;
    } else {
        let pretty = serde_json::to_string_pretty(value)
            .map_err(|err| Failure::internal("serialize_failed", &err.to_string()))?;
        println!("{pretty}");
    }
    Ok(())
}

fn write_artifact<T: Serialize>(cli: &Cli, path: &Path, value: &T) -> Result<(), Failure> {
    let bytes = canonical_bytes(value)?;
    fs::write(path, &bytes).map_err(|err| Failure::io(path, &err))?;
    if !cli.quiet && !cli.json {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, Failure> {
    stable_json_bytes(value).map_err(|err| Failure::internal("serialize_failed", &err.to_string()))
}
