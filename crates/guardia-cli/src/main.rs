//! guardia CLI - Monthly On-Call Shift Assignment
//!
//! Command-line interface for generating, checking and editing a monthly
//! on-call roster stored in a JSON file.

mod render;
mod store;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use guardia_core::budget::{check_submission, BudgetDecision};
use guardia_core::calendar::YearMonth;
use guardia_core::{
    EngineConfig, GenerationReport, MonthRepository, Preference, PreferenceKind, Renderer,
    ShiftGenerator,
};
use guardia_solver::{audit_schedule, month_stats, validate_assignment, ShiftSolver, ViolationCode};

use render::{stats_table, violations_list, JsonRenderer, TextRenderer};
use store::{JsonStore, Shift};

#[derive(Parser)]
#[command(name = "guardia")]
#[command(author, version, about = "Monthly on-call shift assignment", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Roster file
    #[arg(long, env = "GUARDIA_STORE", default_value = "guardia.json", global = true)]
    store: PathBuf,

    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(long, env = "GUARDIA_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Want,
    Avoid,
    Lock,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schedule of a month
    Generate {
        /// Target month (YYYY-MM)
        #[arg(long)]
        month: YearMonth,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Print the schedule without saving it
        #[arg(long)]
        dry_run: bool,

        /// Recorded in the generation report
        #[arg(long, env = "USER")]
        initiator: Option<String>,
    },

    /// Audit the stored shifts of a month
    Check {
        #[arg(long)]
        month: YearMonth,
    },

    /// Per-person statistics for a month
    Stats {
        #[arg(long)]
        month: YearMonth,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Enter a shift by hand
    Assign {
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        first: String,

        #[arg(long)]
        second: String,

        /// Save despite rule violations
        #[arg(long, requires = "reason")]
        force: bool,

        /// Why the rules were overridden
        #[arg(long)]
        reason: Option<String>,
    },

    /// Submit a preference, subject to the monthly budgets
    Prefer {
        #[arg(long)]
        person: String,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long, value_enum)]
        kind: Kind,

        /// Strength of a WANT/AVOID; 0 removes it
        #[arg(long, default_value_t = 0)]
        points: u8,

        /// Lift the locked-day limit
        #[arg(long)]
        admin: bool,
    },

    /// Delete every stored shift of a month
    Reset {
        #[arg(long)]
        month: YearMonth,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    let mut store = JsonStore::open(&cli.store)
        .with_context(|| format!("failed to open roster {}", cli.store.display()))?;

    match cli.command {
        Commands::Generate {
            month,
            format,
            dry_run,
            initiator,
        } => cmd_generate(&mut store, config, month, format, dry_run, initiator),
        Commands::Check { month } => cmd_check(&store, &config, month),
        Commands::Stats { month, format } => cmd_stats(&store, month, format),
        Commands::Assign {
            date,
            first,
            second,
            force,
            reason,
        } => cmd_assign(&mut store, &config, date, first, second, force, reason),
        Commands::Prefer {
            person,
            date,
            kind,
            points,
            admin,
        } => cmd_prefer(&mut store, &config, person, date, kind, points, admin),
        Commands::Reset { month } => {
            let removed = store.reset_month(month);
            store.save()?;
            info!(%month, removed, "month reset");
            println!("Removed {removed} shift(s) from {month}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_generate(
    store: &mut JsonStore,
    config: EngineConfig,
    month: YearMonth,
    format: Format,
    dry_run: bool,
    initiator: Option<String>,
) -> Result<ExitCode> {
    let data = store.load_month(month)?;
    let schedule = ShiftSolver::with_config(config).generate(&data)?;

    let output = match format {
        Format::Text => TextRenderer.render(&schedule, &data.people)?,
        Format::Json => JsonRenderer { pretty: true }.render(&schedule, &data.people)?,
    };
    print!("{output}");
    if matches!(format, Format::Json) {
        println!();
    }

    if dry_run {
        info!(%month, "dry run, nothing saved");
    } else {
        store.save_generation(GenerationReport::new(&schedule, initiator))?;
        info!(%month, days = schedule.assignments.len(), "schedule saved");
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(store: &JsonStore, config: &EngineConfig, month: YearMonth) -> Result<ExitCode> {
    let data = store.load_month(month)?;
    let violations = audit_schedule(&data, config, &data.fixed);

    let covered = data.fixed.len();
    let days = month.num_days() as usize;
    println!("{month}: {covered} of {days} day(s) assigned");

    if violations.is_empty() {
        println!("No violations");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} violation(s):", violations.len());
        print!("{}", violations_list(&violations));
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_stats(store: &JsonStore, month: YearMonth, format: Format) -> Result<ExitCode> {
    let data = store.load_month(month)?;
    let stats = month_stats(&data.people, &data.fixed);

    match format {
        Format::Text => print!("{}", stats_table(month, &stats, &data.people)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_assign(
    store: &mut JsonStore,
    config: &EngineConfig,
    date: NaiveDate,
    first: String,
    second: String,
    force: bool,
    reason: Option<String>,
) -> Result<ExitCode> {
    let data = store.load_month(YearMonth::of(date))?;
    let violations = validate_assignment(&data, config, date, &first, &second);

    // Nothing can force a shift onto an unknown person or the same person twice
    let structural = violations
        .iter()
        .any(|v| matches!(v.code, ViolationCode::SameUser | ViolationCode::UserNotFound));

    if !violations.is_empty() {
        eprintln!("{} violation(s):", violations.len());
        eprint!("{}", violations_list(&violations));
        if structural || !force {
            if !structural {
                eprintln!("Use --force --reason <REASON> to save anyway");
            }
            return Ok(ExitCode::FAILURE);
        }
        warn!(%date, %first, %second, reason = reason.as_deref().unwrap_or(""), "forcing shift");
    }

    store.put_shift(Shift {
        date,
        first,
        second,
        forced: force && !violations.is_empty(),
        reason,
    });
    store.save()?;
    println!("Saved shift for {date}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_prefer(
    store: &mut JsonStore,
    config: &EngineConfig,
    person: String,
    date: NaiveDate,
    kind: Kind,
    points: u8,
    admin: bool,
) -> Result<ExitCode> {
    if store.person(&person).is_none() {
        bail!("unknown person '{person}'");
    }

    let kind = match kind {
        Kind::Want => PreferenceKind::Want(points),
        Kind::Avoid => PreferenceKind::Avoid(points),
        Kind::Lock => PreferenceKind::Lock,
    };
    let candidate = Preference::new(person, date, kind);
    let existing = store.preferences_of(&candidate.person, YearMonth::of(date));

    match check_submission(&existing, &candidate, config, admin)? {
        BudgetDecision::Upsert => {
            println!("Saved {} for {} on {}", candidate.kind, candidate.person, date);
            store.upsert_preference(candidate);
        }
        BudgetDecision::Remove => {
            store.remove_preference(&candidate.person, date);
            println!("Removed preference of {} on {}", candidate.person, date);
        }
    }
    store.save()?;
    Ok(ExitCode::SUCCESS)
}
