//! Structured logging for ledspec using the tracing crate.
//!
//! Logs go to a daily-rotated file under the XDG state directory, never to the
//! terminal, which belongs to the matrix view. Only the 7 newest files are kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Prefix of every log file; rotation appends `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "ledspec.log";

const MAX_LOG_FILES: usize = 7;

/// Keeps the non-blocking writer alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs the file subscriber. The level comes from `RUST_LOG`, default `info`.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: Failed to clean up old logs: {e}");
    }

    let (non_blocking, guard) =
        tracing_appender::non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// `$XDG_STATE_HOME/ledspec`, or `~/.local/state/ledspec`.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn log_dir() -> anyhow::Result<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        if !xdg_state.is_empty() {
            return Ok(PathBuf::from(xdg_state).join("ledspec"));
        }
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/ledspec"))
}

/// Whether `file_name` is a rotated log, `ledspec.log.YYYY-MM-DD`.
pub fn is_rotated_log(file_name: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| date.matches('-').count() == 2)
}

/// Log files in `log_dir`, newest first.
///
/// # Errors
/// - If the directory cannot be read
pub fn log_files(log_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            if !is_rotated_log(name) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(files.into_iter().map(|(path, _)| path).collect())
}

fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    for path in log_files(log_dir)?.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_log_names() {
        assert!(is_rotated_log("ledspec.log.2026-10-19"));
        assert!(!is_rotated_log("ledspec.log"));
        assert!(!is_rotated_log("ledspec.toml"));
        assert!(!is_rotated_log("other.log.2026-10-19"));
        assert!(!is_rotated_log("ledspec.logx2026-10-19"));
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = std::env::temp_dir().join(format!("ledspec_logs_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for day in 1..=9 {
            fs::write(dir.join(format!("ledspec.log.2026-10-{day:02}")), "x").unwrap();
        }
        fs::write(dir.join("notes.txt"), "keep").unwrap();

        cleanup_old_logs(&dir).unwrap();
        assert_eq!(log_files(&dir).unwrap().len(), MAX_LOG_FILES);
        assert!(dir.join("notes.txt").exists());

        fs::remove_dir_all(&dir).ok();
    }
}
