// src/driver.rs
//
// Boundary to the page driver. The engine never navigates; it asks a
// `PageSource` to wait for a condition and hand over a snapshot. Every call
// here may block; nothing in `specs` or `engine::{stitch, compare}` does.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, FixedOffset, Offset, Utc};
use log::debug;

use crate::config::consts::WAIT_POLL_MS;
use crate::core::{Document, DomView, Month, NodeId};
use crate::core::sanitize::contains_ci;
use crate::error::DriverError;

/// Page Snapshot Provider.
pub trait PageSource: Send {
    /// Current rendered state.
    fn snapshot(&mut self) -> Result<Document, DriverError>;

    /// Block until `ready` holds on a snapshot or `timeout` elapses.
    /// `Ok(false)` on timeout; the caller treats that as "not found".
    fn wait_for(&mut self, ready: &dyn Fn(&Document) -> bool, timeout: Duration) -> Result<bool, DriverError>;
}

/// In-memory page: already rendered, never changes.
#[derive(Clone, Debug)]
pub struct StaticSource {
    doc: Document,
}

impl StaticSource {
    pub fn new(html: &str) -> Self {
        Self { doc: Document::parse(html) }
    }
}

impl PageSource for StaticSource {
    fn snapshot(&mut self) -> Result<Document, DriverError> {
        Ok(self.doc.clone())
    }

    fn wait_for(&mut self, ready: &dyn Fn(&Document) -> bool, _timeout: Duration) -> Result<bool, DriverError> {
        Ok(ready(&self.doc))
    }
}

/// Saved page snapshot on disk (e.g. dumped by a browser session).
/// `wait_for` re-reads the file until `ready` holds, so a writer can
/// still be producing it.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    poll: Duration,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), poll: Duration::from_millis(WAIT_POLL_MS) }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    fn read(&self) -> Result<Document, DriverError> {
        let html = std::fs::read_to_string(&self.path).map_err(|e| DriverError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(Document::parse(&html))
    }
}

impl PageSource for FileSource {
    fn snapshot(&mut self) -> Result<Document, DriverError> {
        self.read()
    }

    fn wait_for(&mut self, ready: &dyn Fn(&Document) -> bool, timeout: Duration) -> Result<bool, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            // A missing file may still appear; other read errors are final.
            match self.read() {
                Ok(doc) if ready(&doc) => return Ok(true),
                Ok(_) => {}
                Err(e) if self.path.exists() => return Err(e),
                Err(_) => {}
            }
            if Instant::now() >= deadline {
                debug!("wait on {} timed out", self.path.display());
                return Ok(false);
            }
            thread::sleep(self.poll);
        }
    }
}

/// Lock Signal Provider. Derived from page markers, independent of the
/// series values.
pub trait LockSignalProvider: Send {
    fn lock_signal(&mut self, page: &Document) -> Result<bool, DriverError>;
}

/// Lock icon presence: an element whose `class`, `data-icon`, `aria-label`
/// or `title` mentions the lock marker and not the unlock marker.
#[derive(Clone, Debug)]
pub struct MarkerLock {
    pub marker: String,
    pub unlock_marker: String,
}

impl MarkerLock {
    pub fn new(marker: &str, unlock_marker: &str) -> Self {
        Self { marker: s!(marker), unlock_marker: s!(unlock_marker) }
    }

    pub fn detect<D: DomView + ?Sized>(&self, dom: &D) -> bool {
        const ATTRS: [&str; 4] = ["class", "data-icon", "aria-label", "title"];
        let hit = |n: NodeId| {
            ATTRS.iter().filter_map(|a| dom.attr(n, a)).any(|v| {
                contains_ci(v, &self.marker)
                    && (self.unlock_marker.is_empty() || !contains_ci(v, &self.unlock_marker))
            })
        };
        !dom.find_all(dom.root(), &hit).is_empty()
    }
}

impl LockSignalProvider for MarkerLock {
    fn lock_signal(&mut self, page: &Document) -> Result<bool, DriverError> {
        Ok(self.detect(page))
    }
}

/// Lock state known up front (manifest override, tests).
#[derive(Clone, Copy, Debug)]
pub struct FixedLock(pub bool);

impl LockSignalProvider for FixedLock {
    fn lock_signal(&mut self, _page: &Document) -> Result<bool, DriverError> {
        Ok(self.0)
    }
}

/// Current-Period Provider.
pub trait PeriodProvider {
    fn pivot_label(&self) -> Month;
}

impl PeriodProvider for Month {
    fn pivot_label(&self) -> Month {
        *self
    }
}

/// Current calendar month at a fixed UTC offset.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentMonth {
    pub utc_offset_hours: i32,
}

impl PeriodProvider for CurrentMonth {
    fn pivot_label(&self) -> Month {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        let month = Utc::now().with_timezone(&offset).month();
        Month::from_number(month).unwrap_or(Month::Jan)
    }
}
