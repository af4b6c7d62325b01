//! Command-line interface for inspecting alarm-clock bindings.
//!
//! Each invocation is one session: a simulated host is seeded from a fixture,
//! the add-on binds to it, the command runs, and the result is printed as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use softdep_alarms::{AlarmClockAddon, AlarmClockConfig, AlarmField, AlarmSnapshot, AlarmType};
use softdep_core::DynHostLoader;
use softdep_testing::{ProviderFixture, SimulatedAlarmClock, SimulatedHost};

/// softdep - Inspect soft-dependency bindings against a simulated provider.
#[derive(Parser, Debug)]
#[command(name = "softdep")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Provider fixture (JSON). Defaults to an empty, ready provider.
    #[arg(short, long, global = true)]
    fixture: Option<PathBuf>,

    /// Binding configuration (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run without the provider installed.
    #[arg(long, global = true)]
    no_provider: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether the provider is installed and ready.
    Status,
    /// List the provider's alarms.
    List,
    /// Create an alarm.
    Create {
        /// Alarm type name (e.g. Maneuver, SOIChange).
        #[arg(long = "type", value_parser = parse_alarm_type, default_value = "Raw")]
        alarm_type: AlarmType,
        /// Alarm name.
        #[arg(long)]
        name: String,
        /// Trigger time in UT seconds.
        #[arg(long)]
        ut: f64,
        /// Vessel to attach the alarm to.
        #[arg(long, default_value = "")]
        vessel: String,
    },
    /// Delete an alarm by ID.
    Delete {
        /// Alarm ID.
        id: String,
    },
    /// Replace an alarm's notes.
    SetNotes {
        /// Alarm ID.
        id: String,
        /// New notes.
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct StatusReport {
    installed: bool,
    ready: bool,
    version: Option<String>,
    record_type: String,
    missing_fields: Vec<AlarmField>,
}

#[derive(Debug, Serialize)]
struct CreateReport {
    id: Option<String>,
    alarms: Vec<AlarmSnapshot>,
}

#[derive(Debug, Serialize)]
struct DeleteReport {
    id: String,
    deleted: bool,
    remaining: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = match &args.config {
        Some(path) => AlarmClockConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => AlarmClockConfig::from_env(),
    };

    // The provider must outlive the session; the host only holds its types.
    let clock = load_provider(args.fixture.as_deref())?;
    let host = Arc::new(SimulatedHost::new());
    if !args.no_provider {
        host.install(&clock);
    }
    let loader: DynHostLoader = host;
    let addon = AlarmClockAddon::with_config(loader, config);
    tracing::info!(
        installed = addon.is_installed(),
        ready = addon.ready(),
        "Starting softdep session"
    );

    match args.command {
        Command::Status => print_json(&status(&addon)),
        Command::List => print_json(&addon.list_alarms().snapshots()),
        Command::Create {
            alarm_type,
            name,
            ut,
            vessel,
        } => {
            let id = addon.create_alarm(alarm_type, &name, ut, &vessel);
            if id.is_none() {
                tracing::warn!(name = %name, "No alarm was created");
            }
            print_json(&CreateReport {
                id,
                alarms: addon.list_alarms().snapshots(),
            })
        }
        Command::Delete { id } => {
            let deleted = addon.delete_alarm(&id);
            print_json(&DeleteReport {
                id,
                deleted,
                remaining: addon.list_alarms().len(),
            })
        }
        Command::SetNotes { id, text } => {
            let Some(alarm) = addon.find_alarm(&id) else {
                tracing::warn!(id = %id, "No alarm with this ID in the provider collection");
                bail!("Alarm not found: {}", id);
            };
            if let Err(e) = alarm.set_notes(&text) {
                tracing::warn!(id = %id, "Notes write rejected by provider: {}", e);
                bail!("Failed to set notes: {}", e);
            }
            print_json(&alarm.snapshot())
        }
    }
}

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("softdep=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_provider(fixture: Option<&std::path::Path>) -> Result<SimulatedAlarmClock> {
    match fixture {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading provider fixture");
            Ok(ProviderFixture::load(path)?.build())
        }
        None => Ok(SimulatedAlarmClock::ready()),
    }
}

fn status(addon: &AlarmClockAddon) -> StatusReport {
    let alarms = addon.collection();
    StatusReport {
        installed: addon.is_installed(),
        ready: addon.ready(),
        version: addon.provider_version().map(|v| v.to_string()),
        record_type: alarms.config().record_type.clone(),
        missing_fields: alarms
            .capabilities()
            .map(|caps| caps.missing())
            .unwrap_or_else(|| AlarmField::ALL.to_vec()),
    }
}

fn parse_alarm_type(s: &str) -> Result<AlarmType, String> {
    AlarmType::from_name(s).ok_or_else(|| {
        let known: Vec<&str> = AlarmType::ALL.iter().map(|t| t.name()).collect();
        format!("unknown alarm type '{}', expected one of: {}", s, known.join(", "))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
