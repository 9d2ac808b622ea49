//! Display recent log entries from the application.

use crate::logging;
use anyhow::anyhow;
use std::fs;

const DEFAULT_LINES: usize = 50;

/// Prints the last lines of the newest log file.
///
/// # Errors
/// - If the log directory cannot be determined or read
/// - If the log file cannot be read
pub fn handle_logs() -> anyhow::Result<()> {
    let log_dir = logging::log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = logging::log_files(&log_dir)?.into_iter().next() else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'ledspec' to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let (shown, total) = tail(&content, DEFAULT_LINES);
    if shown.len() < total {
        println!("Showing last {} of {} lines:", shown.len(), total);
    } else {
        println!("Showing all {total} lines:");
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in shown {
        println!("{line}");
    }

    Ok(())
}

/// Last `count` lines of `content`, and the total number of lines.
fn tail(content: &str, count: usize) -> (Vec<&str>, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();
    let start = total.saturating_sub(count);
    (lines[start..].to_vec(), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail() {
        let (shown, total) = tail("a\nb\nc\nd", 2);
        assert_eq!(shown, vec!["c", "d"]);
        assert_eq!(total, 4);

        let (shown, total) = tail("a\nb", 50);
        assert_eq!(shown, vec!["a", "b"]);
        assert_eq!(total, 2);
    }
}
