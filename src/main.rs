use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

use macsweep::cleanup::CleanupEngine;
use macsweep::cleanup::executor::ExecuteOptions;
use macsweep::cleanup::plan::{Category, PathStatus, ScanReport};
use macsweep::cleanup::scanner::{self, ScanContext};
use macsweep::cleanup::{apps, leftovers};
use macsweep::config::{self, Config};
use macsweep::format::{format_bytes, format_percent, format_rate};
use macsweep::procs::{self, SortKey, kill::TerminateResult};
use macsweep::telemetry::collector::Collector;
use macsweep::telemetry::history::MetricHistory;
use macsweep::telemetry::rates::Unit;
use macsweep::telemetry::sampler::{Reading, Sampler};

#[derive(Parser)]
#[command(
    name = "macsweep",
    about = "macOS resource monitor with safe cache and app-leftover cleanup"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print live classified resource readings until Ctrl-C
    Watch {
        /// Sampling interval in seconds (1-10)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Scan the known cache roots and print the reviewable plan
    Scan {
        #[arg(long, value_enum, default_value_t = ScanScope::All)]
        category: ScanScope,
        #[arg(long)]
        json: bool,
    },
    /// Scan, then move the deletable set to the trash
    Clean {
        #[arg(long, value_enum, default_value_t = ScanScope::All)]
        category: ScanScope,
        /// Explicit confirmation; without it the plan is only printed
        #[arg(long)]
        yes: bool,
    },
    /// List installed applications
    Apps {
        #[arg(long)]
        json: bool,
    },
    /// List filesystem artifacts associated with a bundle identifier
    Leftovers {
        bundle_id: String,
        #[arg(long)]
        json: bool,
    },
    /// List processes
    Ps {
        /// Sort key: cpu, memory, pid, name
        #[arg(long, default_value = "cpu")]
        sort: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Terminate a process (SIGTERM, or SIGKILL with --force)
    Kill {
        pid: u32,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScanScope {
    All,
    Browser,
    App,
    Logs,
    Tmp,
}

impl ScanScope {
    fn category(self) -> Option<Category> {
        match self {
            ScanScope::All => None,
            ScanScope::Browser => Some(Category::BrowserCache),
            ScanScope::App => Some(Category::AppCache),
            ScanScope::Logs => Some(Category::SystemLog),
            ScanScope::Tmp => Some(Category::Tmp),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    match cli.command {
        Command::Watch { interval_secs } => run_watch(config, interval_secs).await,
        Command::Scan { category, json } => {
            let report = run_scan(&config, category).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Command::Clean { category, yes } => run_clean(&config, category, yes).await,
        Command::Apps { json } => run_apps(json).await,
        Command::Leftovers { bundle_id, json } => run_leftovers(&config, bundle_id, json).await,
        Command::Ps { sort, limit, json } => run_ps(&sort, limit, json),
        Command::Kill { pid, force } => run_kill(pid, force),
    }
}

async fn run_watch(mut config: Config, interval_secs: Option<u64>) -> Result<()> {
    if let Some(secs) = interval_secs {
        config.general.refresh_interval_secs = secs;
    }
    let mut history = MetricHistory::new(config.general.history_capacity);
    let mut sampler = Sampler::spawn(&config);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            reading = sampler.next() => match reading {
                Some(reading) => {
                    for rate in &reading.rates {
                        history.record(rate.kind, rate.value);
                    }
                    println!("{}", render_reading(&reading));
                }
                None => break,
            }
        }
    }
    Ok(())
}

fn render_reading(reading: &Reading) -> String {
    let mut parts = Vec::new();
    for rate in &reading.rates {
        let value = match rate.unit {
            Unit::Percent => format_percent(rate.value),
            Unit::BytesPerSec => format_rate(rate.value),
            // Estimate derived from load, not a sensor; keep the tilde.
            Unit::Celsius => format!("~{:.0}C", rate.value),
        };
        let level = reading
            .levels
            .iter()
            .find(|(kind, _)| *kind == rate.kind)
            .map(|(_, level)| format!(" [{}]", level.label()))
            .unwrap_or_default();
        parts.push(format!("{} {}{}", rate.kind.label(), value, level));
    }
    if parts.is_empty() {
        parts.push("warming up".to_string());
    }
    if reading.stale {
        parts.push("(stale)".to_string());
    }
    parts.join(" | ")
}

async fn run_scan(config: &Config, scope: ScanScope) -> Result<ScanReport> {
    let home = home_dir()?;
    let depth = config.general.scan_depth;
    let category = scope.category();

    let report = tokio::task::spawn_blocking(move || {
        let mut collector = Collector::new();
        let mut ctx = ScanContext::new(home.clone(), depth);
        ctx.running = collector.running_process_names();
        let roots = scanner::default_roots(&home, category);
        CleanupEngine::new().scan(&roots, &ctx)
    })
    .await??;
    Ok(report)
}

fn print_report(report: &ScanReport) {
    for entry in report.plan.paths() {
        println!(
            "{:>10}  {:<14} {}",
            format_bytes(entry.size_bytes),
            entry.category.label(),
            entry.path.display()
        );
    }
    for entry in &report.excluded {
        println!(
            "{:>10}  {:<14} {} (excluded: {:?})",
            format_bytes(entry.size_bytes),
            entry.category.label(),
            entry.path.display(),
            entry.protection
        );
    }
    for err in &report.errors {
        println!("   skipped  {} ({})", err.path.display(), err.reason);
    }
    println!(
        "{} paths, {} reclaimable",
        report.plan.len(),
        format_bytes(report.plan.total_bytes())
    );
    if report.truncated {
        println!("scan was cancelled before covering every root; results are partial");
    }
    if report.plan.running_owner_warning {
        println!("warning: some caches belong to apps that are currently running");
    }
}

async fn run_clean(config: &Config, scope: ScanScope, yes: bool) -> Result<()> {
    let report = run_scan(config, scope).await?;
    print_report(&report);

    if report.plan.is_empty() {
        return Ok(());
    }
    if !yes {
        println!("re-run with --yes to move the paths above to the trash");
        return Ok(());
    }

    let home = home_dir()?;
    let plan = report.plan.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut opts = ExecuteOptions::new(home);
        // Fresh liveness for the pre-move re-verification; apps may have
        // launched since the scan.
        opts.running = Collector::new().running_process_names();
        CleanupEngine::new().execute(&plan, true, &opts)
    })
    .await??;

    println!(
        "removed {} ({}), skipped {}",
        result.removed,
        format_bytes(result.bytes_freed),
        result.skipped
    );
    for outcome in result
        .outcomes
        .iter()
        .filter(|o| o.status != PathStatus::Removed)
    {
        println!("  {} -> {:?}", outcome.path.display(), outcome.status);
    }
    Ok(())
}

async fn run_apps(json: bool) -> Result<()> {
    let home = home_dir()?;
    let records = tokio::task::spawn_blocking(move || {
        let mut collector = Collector::new();
        let running = collector.running_process_names();
        apps::discover_apps(&apps::default_app_roots(&home), &running)
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    for record in &records {
        println!(
            "{:<30} {:<40} {}{}",
            record.display_name,
            record.bundle_id,
            record.install_path.display(),
            if record.is_running { "  (running)" } else { "" }
        );
    }
    Ok(())
}

async fn run_leftovers(config: &Config, bundle_id: String, json: bool) -> Result<()> {
    let home = home_dir()?;
    let depth = config.general.scan_depth;
    let (found, errors) = tokio::task::spawn_blocking(move || {
        let running = Collector::new().running_process_names();
        let apps = apps::discover_apps(&apps::default_app_roots(&home), &running);
        let owner_running = apps
            .iter()
            .any(|a| a.bundle_id == bundle_id && a.is_running);
        leftovers::resolve_leftovers(&bundle_id, &home, depth, owner_running)
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    for entry in &found {
        println!(
            "{:>10}  {} ({:?})",
            format_bytes(entry.size_bytes),
            entry.path.display(),
            entry.protection
        );
    }
    for err in &errors {
        println!("   skipped  {} ({})", err.path.display(), err.reason);
    }
    Ok(())
}

fn run_ps(sort: &str, limit: usize, json: bool) -> Result<()> {
    let mut sys = sysinfo::System::new();
    procs::refresh_processes(&mut sys);
    // Two refreshes a beat apart so per-process CPU% is meaningful.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    procs::refresh_processes(&mut sys);

    let mut entries = procs::collect_processes(&sys);
    procs::sort_processes(&mut entries, SortKey::from_str_config(sort));
    entries.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{:>7}  {:>6}  {:>10}  {}",
            entry.pid,
            format!("{:.1}%", entry.cpu_percent),
            format_bytes(entry.memory_bytes),
            entry.name
        );
    }
    Ok(())
}

fn run_kill(pid: u32, force: bool) -> Result<()> {
    let mut sys = sysinfo::System::new();
    procs::refresh_processes(&mut sys);
    match procs::kill::terminate(&sys, pid, force) {
        TerminateResult::Signaled(pid, signal) => {
            println!("sent {signal} to {pid}");
            Ok(())
        }
        TerminateResult::Refused(pid, reason) => Err(eyre!("pid {pid}: {reason}")),
        TerminateResult::Failed(_, message) => Err(eyre!(message)),
        TerminateResult::NotFound(pid) => Err(eyre!("no process with pid {pid}")),
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))
}
