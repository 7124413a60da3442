// src/logging.rs
//
// Logging bootstrap. Library code logs through the `log` facade only;
// frontends call `init` once to install `env_logger` with the elapsed-time
// line format `[hh:mm:ss.mmm][LEVEL] msg`.
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use env_logger::{Builder, Env, Target};

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Install the global logger.
///
/// `default_level` applies when `RUST_LOG` is unset. With `file = Some(path)`
/// lines are appended to that file (parent dirs created); otherwise stderr.
/// Calling twice is harmless: the second install is ignored.
pub fn init(default_level: &str, file: Option<&Path>) -> std::io::Result<()> {
    start();

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format(|buf, record| {
        let elapsed = fmt_elapsed(start().elapsed().as_millis());
        writeln!(buf, "[{elapsed}][{}] {}", record.level(), record.args())
    });

    if let Some(path) = file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sink = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(sink)));
    } else {
        builder.target(Target::Stderr);
    }

    let _ = builder.try_init();
    Ok(())
}
