// src/runner.rs
use std::{
    thread,
    sync::{ mpsc, Arc, atomic::{ AtomicUsize, Ordering }}
};

use log::{debug, warn};

use crate::{
    config::CheckOptions,
    engine::{ ComparisonUnit, run_comparison, types::{ Diagnostics, Outcome, UnitKey, UnitReport }},
    error::{ CheckError, DriverError },
    progress::Progress,
};

/// Recipe for one comparison unit. `open` acquires fresh page sessions each
/// time it is called, so a whole-unit retry starts from scratch.
pub trait UnitPlan: Send + Sync + 'static {
    fn key(&self) -> UnitKey;
    fn open(&self) -> Result<ComparisonUnit, CheckError>;
}

/// Run one plan with up to `opts.retries` re-runs on retryable errors.
/// Sessions are dropped at the end of every attempt.
pub fn run_plan<P: UnitPlan + ?Sized>(plan: &P, opts: &CheckOptions) -> UnitReport {
    let mut attempt = 0u32;
    loop {
        let report = match plan.open() {
            Ok(mut unit) => run_comparison(&mut unit, opts),
            Err(e) => error_report(plan.key(), e),
        };
        let retry = report.error().is_some_and(CheckError::is_retryable) && attempt < opts.retries;
        if !retry {
            return report;
        }
        attempt += 1;
        warn!("{}: retrying ({attempt}/{})", report.key, opts.retries);
    }
}

fn error_report(key: UnitKey, err: CheckError) -> UnitReport {
    UnitReport {
        key,
        outcome: Outcome::Error(err),
        mismatches: Vec::new(),
        compared_count: 0,
        diagnostics: Diagnostics::default(),
    }
}

/// Run every plan on a bounded pool of `opts.workers` threads. Units share
/// nothing but the cursor; reports come back in input order.
pub fn run_all<P: UnitPlan>(
    plans: Vec<P>,
    opts: &CheckOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Vec<UnitReport> {
    let total = plans.len();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }
    if total == 0 {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No units to check.");
            p.finish();
        }
        return Vec::new();
    }

    let plans = Arc::new(plans);
    let opts_arc = Arc::new(opts.clone());
    let counter = Arc::new(AtomicUsize::new(0));
    let (res_tx, res_rx) = mpsc::channel::<(usize, UnitReport)>();

    let workers = opts.workers.min(total).max(1);
    debug!("spawning {workers} workers for {total} units");

    for _ in 0..workers {
        let plans = Arc::clone(&plans);
        let opts = Arc::clone(&opts_arc);
        let idx = Arc::clone(&counter);
        let tx = res_tx.clone();

        thread::spawn(
            move || {
                loop {
                    let i = idx.fetch_add(1, Ordering::Relaxed);
                    if i >= plans.len() {
                        break;
                    }
                    let report = run_plan(&plans[i], &opts);
                    if tx.send((i, report)).is_err() {
                        break;
                    }
                }
            }
        );
    }
    drop(res_tx); // main thread is sole receiver now

    let mut slots: Vec<Option<UnitReport>> = (0..total).map(|_| None).collect();
    for _ in 0..total {
        match res_rx.recv() {
            Ok((i, report)) => {
                if let Some(p) = progress.as_deref_mut() {
                    match report.error() {
                        Some(e) => p.item_failed(i, &report.key, e),
                        None => p.item_done(i, &report.key),
                    }
                }
                slots[i] = Some(report);
            }
            Err(_) => break, // a worker died; the gaps are filled below
        }
    }

    let reports = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| {
                let err = CheckError::Driver(DriverError::Unavailable(s!("worker terminated")));
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(i, &plans[i].key(), &err);
                }
                error_report(plans[i].key(), err)
            })
        })
        .collect();

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    reports
}
