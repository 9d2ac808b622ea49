//! First-run setup and config migration.

pub mod version;

use std::path::Path;
use version::SetupAction;

/// Embedded default configuration, without its version line.
const DEFAULT_CONFIG: &str = include_str!("../../environments/ledspec.toml");

/// Installs or migrates the config file at `config_path` as needed.
///
/// A missing file is written from the embedded default. An older file keeps the
/// user's settings; only its version line is updated, since every field has a
/// default and new fields need no migration.
///
/// # Errors
/// - If the file cannot be read or written
/// - If the recorded version is malformed
pub fn ensure_config(config_path: &Path) -> anyhow::Result<SetupAction> {
    let action = version::check_setup_needed(config_path)?;

    match &action {
        SetupAction::Install => {
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(config_path, version::with_current_version(DEFAULT_CONFIG)?)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
        }
        SetupAction::Migrate { from } => {
            let content = std::fs::read_to_string(config_path)?;
            std::fs::write(config_path, version::with_current_version(&content)?)?;
            tracing::info!(
                "Migrated configuration from version {} to {}",
                from,
                version::CURRENT_VERSION
            );
        }
        SetupAction::UpToDate => {
            tracing::debug!("Config version up to date ({})", version::CURRENT_VERSION);
        }
    }

    Ok(action)
}
