//! Opens the configuration file in the user's editor.

use crate::config::config_path;
use std::process::Command;

/// Opens `~/.config/ledspec/ledspec.toml` in `$EDITOR`, falling back to nano or vi.
///
/// The file is checked after the editor exits so mistakes show up immediately
/// rather than on the next run.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the editor exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()?;
    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor(std::env::var("EDITOR").ok(), is_editor_available)?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    match crate::config::LedspecConfig::load_from(&config_path) {
        Ok(config) => {
            if let Err(e) = crate::analyzer::Settings::new(&config, config.audio.sample_rate) {
                println!("Warning: {e}");
            }
        }
        Err(e) => println!("Warning: {e}"),
    }

    tracing::info!("Config file edited");
    Ok(())
}

/// Picks `$EDITOR` when set, otherwise the first available of nano and vi.
fn find_editor(
    env_editor: Option<String>,
    available: impl Fn(&str) -> bool,
) -> anyhow::Result<String> {
    if let Some(editor) = env_editor.filter(|e| !e.is_empty()) {
        return Ok(editor);
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| available(editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
