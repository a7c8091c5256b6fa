//! Logging for scriptdock.
//!
//! Routes every `log::info!()` / `log::warn!()` etc. from all workspace crates
//! into a single session file:
//!
//! - `/tmp/scriptdock_debug.log` on Unix/macOS
//! - `%TEMP%\scriptdock_debug.log` on Windows
//!
//! Output stays out of stdout/stderr so it never mixes with the host editor's
//! own console. When `RUST_LOG` is set, lines are mirrored to stderr too.

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

const LOG_FILE_NAME: &str = "scriptdock_debug.log";

/// Path of the session log file.
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    {
        PathBuf::from("/tmp").join(LOG_FILE_NAME)
    }
    #[cfg(not(unix))]
    {
        std::env::temp_dir().join(LOG_FILE_NAME)
    }
}

struct LogBridge {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl LogBridge {
    fn open(level: LevelFilter, mirror_stderr: bool) -> Self {
        let file = if level == LevelFilter::Off {
            None
        } else {
            // Silently run without a file if it can't be opened
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
        };

        let bridge = Self {
            level,
            file: Mutex::new(file),
            mirror_stderr,
        };
        bridge.write_raw(&format!(
            "{}\nscriptdock debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            timestamp(),
            level,
            "=".repeat(80)
        ));
        bridge
    }

    fn write_raw(&self, msg: &str) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<&'static LogBridge> = OnceLock::new();

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Level requested through `RUST_LOG`, if it names a plain level.
fn env_level() -> Option<LevelFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
}

/// Pick the effective level: explicit CLI level, then `RUST_LOG`, then config.
pub fn resolve_level(cli: Option<LevelFilter>, configured: LevelFilter) -> LevelFilter {
    cli.or_else(env_level).unwrap_or(configured)
}

/// Install the log bridge as the global logger.
///
/// Only the first call takes effect; later calls only adjust the max level.
pub fn init_log_bridge(level: LevelFilter) {
    let mirror_stderr = std::env::var_os("RUST_LOG").is_some();
    let bridge =
        BRIDGE.get_or_init(|| Box::leak(Box::new(LogBridge::open(level, mirror_stderr))));
    if log::set_logger(*bridge).is_err() {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level.min(bridge.level));
}
