// src/cli.rs
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use log::info;

use crate::config::CheckOptions;
use crate::core::Month;
use crate::engine::types::UnitReport;
use crate::logging;
use crate::manifest::{FilePlan, LockSpec, Manifest, UnitEntry};
use crate::progress::LogProgress;
use crate::report::{self, ExportFormat};
use crate::runner;

/// Compare the locked supply forecast against the stitched demand forecast.
#[derive(Debug, Parser)]
#[command(name = "forecast_check", version, about)]
pub struct Args {
    /// Saved supply page (single-unit mode)
    #[arg(long, requires = "demand", conflicts_with = "units")]
    pub supply: Option<PathBuf>,

    /// Saved demand page (single-unit mode)
    #[arg(long, requires = "supply")]
    pub demand: Option<PathBuf>,

    /// Units manifest (units.toml)
    #[arg(long)]
    pub units: Option<PathBuf>,

    /// Product name for single-unit mode
    #[arg(long, default_value = "unit")]
    pub product: String,

    /// Options file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fixed pivot month, e.g. DEC (default: current month)
    #[arg(long)]
    pub pivot: Option<Month>,

    /// Treat every unit as locked
    #[arg(long, conflicts_with = "unlocked")]
    pub locked: bool,

    /// Treat every unit as unlocked
    #[arg(long)]
    pub unlocked: bool,

    /// Results file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: ExportFormat,

    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub stderr: bool,
}

impl Args {
    fn lock_override(&self) -> Option<bool> {
        match (self.locked, self.unlocked) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Run the checks. `Ok(true)` when no unit failed or errored.
pub fn run(args: Args) -> Result<bool> {
    let mut opts = match &args.config {
        Some(path) => CheckOptions::load(path).wrap_err("loading options")?,
        None => CheckOptions::default(),
    };
    if let Some(n) = args.workers {
        if n == 0 {
            bail!("--workers must be at least 1");
        }
        opts.workers = n;
    }

    let log_file = if args.stderr { None } else { opts.log_file.as_deref() };
    logging::init(&opts.log_level, log_file).wrap_err("starting logger")?;

    let entries = unit_entries(&args)?;
    let plans: Vec<FilePlan> = entries
        .iter()
        .map(|e| {
            let mut plan = FilePlan::from_entry(e, &opts);
            if let Some(p) = args.pivot {
                plan.pivot = p;
            }
            if let Some(v) = args.lock_override() {
                plan.lock = LockSpec::Fixed(v);
            }
            plan
        })
        .collect();

    let mut progress = LogProgress::new();
    let reports = runner::run_all(plans, &opts, Some(&mut progress));

    let out = args.out.clone().unwrap_or_else(|| PathBuf::from(crate::config::consts::DEFAULT_OUT_FILE));
    let records = report::to_records(&reports, Utc::now());
    report::write_records_to(&out, &records, args.format)
        .wrap_err_with(|| format!("writing {}", out.display()))?;
    info!("wrote {} records to {}", records.len(), out.display());

    print_summary(&reports);
    Ok(!reports.iter().any(UnitReport::is_failure))
}

fn unit_entries(args: &Args) -> Result<Vec<UnitEntry>> {
    if let Some(path) = &args.units {
        let manifest = Manifest::load(path).wrap_err_with(|| format!("loading {}", path.display()))?;
        return Ok(manifest.units);
    }
    match (&args.supply, &args.demand) {
        (Some(supply), Some(demand)) => Ok(vec![UnitEntry {
            product: args.product.clone(),
            color: s!(),
            window: s!(),
            supply: supply.clone(),
            demand: demand.clone(),
            pivot: None,
            locked: None,
        }]),
        _ => bail!("give --supply and --demand, or --units"),
    }
}

fn print_summary(reports: &[UnitReport]) {
    for r in reports {
        match r.error() {
            Some(e) => println!("{:<8} {}  {e}", r.status(), r.key),
            None if r.mismatches.is_empty() => {
                println!("{:<8} {}  ({} months)", r.status(), r.key, r.compared_count)
            }
            None => println!(
                "{:<8} {}  {}",
                r.status(),
                r.key,
                report::join_mismatches(&r.mismatches)
            ),
        }
    }
}
