// src/progress.rs
use log::{info, warn};

use crate::engine::types::UnitKey;
use crate::error::CheckError;

/// Lightweight progress reporting for batch runs.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of units.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A unit finished with a verdict (PASS, FAIL or ADVISORY).
    fn item_done(&mut self, _index: usize, _key: &UnitKey) {}

    /// A unit ended in an error.
    fn item_failed(&mut self, _index: usize, _key: &UnitKey, _err: &CheckError) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Forwards progress to the `log` facade, counting as it goes.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
    done: usize,
    failed: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        info!("checking {total} units");
    }

    fn log(&mut self, msg: &str) {
        info!("{msg}");
    }

    fn item_done(&mut self, _index: usize, key: &UnitKey) {
        self.done += 1;
        info!("[{}/{}] {key} done", self.done + self.failed, self.total);
    }

    fn item_failed(&mut self, _index: usize, key: &UnitKey, err: &CheckError) {
        self.failed += 1;
        warn!("[{}/{}] {key} error: {err}", self.done + self.failed, self.total);
    }

    fn finish(&mut self) {
        info!("finished: {} done, {} errors", self.done, self.failed);
    }
}
