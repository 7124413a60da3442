// src/manifest.rs
//! Units manifest (`units.toml`) for batch runs over saved page snapshots.
//!
//! ```toml
//! [[unit]]
//! product = "P1"
//! color = "Black"
//! window = "FY27"
//! supply = "pages/p1_supply.html"
//! demand = "pages/p1_demand.html"
//! pivot = "DEC"     # optional, else the current month
//! locked = true     # optional, else read from the supply page
//! ```
//!
//! Relative page paths resolve against the manifest's directory.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::CheckOptions;
use crate::core::Month;
use crate::driver::{CurrentMonth, FileSource, FixedLock, LockSignalProvider, MarkerLock, PeriodProvider};
use crate::engine::{ComparisonUnit, types::UnitKey};
use crate::error::{CheckError, ConfigError};
use crate::runner::UnitPlan;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    pub product: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub window: String,
    pub supply: PathBuf,
    pub demand: PathBuf,
    #[serde(default)]
    pub pivot: Option<Month>,
    #[serde(default)]
    pub locked: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitEntry>,
}

impl Manifest {
    /// Load and resolve relative page paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let mut manifest = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            manifest.resolve_relative(base);
        }
        Ok(manifest)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let manifest: Self = toml::from_str(text)?;
        if let Some(bad) = manifest.units.iter().find(|u| u.product.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("unit with empty product ({})", bad.supply.display())));
        }
        Ok(manifest)
    }

    fn resolve_relative(&mut self, base: &Path) {
        for u in &mut self.units {
            for p in [&mut u.supply, &mut u.demand] {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }
}

/// How a unit learns its lock state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockSpec {
    Fixed(bool),
    Marker { marker: String, unlock_marker: String },
}

/// A unit backed by two snapshot files.
#[derive(Clone, Debug)]
pub struct FilePlan {
    pub key: UnitKey,
    pub supply: PathBuf,
    pub demand: PathBuf,
    pub pivot: Month,
    pub lock: LockSpec,
}

impl FilePlan {
    /// Fill in what the entry leaves open: pivot from the clock, lock from
    /// the configured page markers.
    pub fn from_entry(entry: &UnitEntry, opts: &CheckOptions) -> Self {
        let pivot = entry
            .pivot
            .unwrap_or_else(|| CurrentMonth { utc_offset_hours: opts.utc_offset_hours }.pivot_label());
        let lock = match entry.locked {
            Some(v) => LockSpec::Fixed(v),
            None => LockSpec::Marker {
                marker: opts.lock_marker.clone(),
                unlock_marker: opts.unlock_marker.clone(),
            },
        };
        Self {
            key: UnitKey {
                product: entry.product.clone(),
                color: entry.color.clone(),
                window: entry.window.clone(),
            },
            supply: entry.supply.clone(),
            demand: entry.demand.clone(),
            pivot,
            lock,
        }
    }
}

impl UnitPlan for FilePlan {
    fn key(&self) -> UnitKey {
        self.key.clone()
    }

    fn open(&self) -> Result<ComparisonUnit, CheckError> {
        let lock: Box<dyn LockSignalProvider> = match &self.lock {
            LockSpec::Fixed(v) => Box::new(FixedLock(*v)),
            LockSpec::Marker { marker, unlock_marker } => Box::new(MarkerLock::new(marker, unlock_marker)),
        };
        Ok(ComparisonUnit::new(
            self.key(),
            self.pivot,
            Box::new(FileSource::new(&self.supply)),
            Box::new(FileSource::new(&self.demand)),
            lock,
        ))
    }
}
