//! Config file versioning.
//!
//! The first line of `ledspec.toml` records the version that wrote it:
//! `config_version = "X.Y.Z"`. Comparing it with the running binary decides
//! whether the file needs to be installed or migrated.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Version of the running binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What startup has to do with the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    /// No config file yet: write the default
    Install,
    /// Config written by an older version (or an unversioned one)
    Migrate { from: String },
    /// Nothing to do
    UpToDate,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version: &str) -> anyhow::Result<Self> {
        let mut parts = version.trim().split('.');
        let mut next = |name: &str| -> anyhow::Result<u32> {
            let part = parts
                .next()
                .ok_or_else(|| anyhow!("Invalid version '{version}': missing {name}"))?;
            part.parse()
                .map_err(|_| anyhow!("Invalid {name} version: '{part}'"))
        };

        let parsed = Self {
            major: next("major")?,
            minor: next("minor")?,
            patch: next("patch")?,
        };
        if parts.next().is_some() {
            return Err(anyhow!(
                "Invalid version format: '{version}'. Expected 'major.minor.patch'"
            ));
        }
        Ok(parsed)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Matches `config_version = "X.Y.Z"` at the start of a line, but not in a comment.
fn version_line() -> anyhow::Result<Regex> {
    Ok(Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?)
}

/// Version recorded on the first line of `content`, if any.
///
/// # Errors
/// - If the version pattern fails to compile
pub fn parse_config_version(content: &str) -> anyhow::Result<Option<String>> {
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };
    Ok(version_line()?
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Decides what to do with the config file at `config_path`.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If the recorded version is malformed
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<SetupAction> {
    if !config_path.exists() {
        return Ok(SetupAction::Install);
    }

    let content = std::fs::read_to_string(config_path)?;
    compare_with_current(parse_config_version(&content)?, CURRENT_VERSION)
}

fn compare_with_current(recorded: Option<String>, current: &str) -> anyhow::Result<SetupAction> {
    let Some(recorded) = recorded else {
        return Ok(SetupAction::Migrate {
            from: "unknown (unversioned config)".to_string(),
        });
    };

    let config_version = SemanticVersion::parse(&recorded)?;
    let current_version = SemanticVersion::parse(current)?;

    Ok(match config_version.cmp(&current_version) {
        Ordering::Less => SetupAction::Migrate { from: recorded },
        Ordering::Equal => SetupAction::UpToDate,
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_version,
                current_version
            );
            SetupAction::UpToDate
        }
    })
}

/// `content` with its version line replaced by (or prefixed with) the current one.
///
/// # Errors
/// - If the version pattern fails to compile
pub fn with_current_version(content: &str) -> anyhow::Result<String> {
    let pattern = version_line()?;
    let version = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let rest: Vec<&str> = content
        .lines()
        .filter(|line| !pattern.is_match(line))
        .collect();

    Ok(if rest.is_empty() {
        version
    } else {
        format!("{version}\n{}\n", rest.join("\n"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse_and_order() {
        let v = SemanticVersion::parse("0.2.5").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 2, 5));
        assert!(SemanticVersion::parse("0.0.9").unwrap() < v);
        assert!(SemanticVersion::parse("1.0.0").unwrap() > v);
        assert_eq!(v.to_string(), "0.2.5");
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.2.3").is_err());
        assert!(SemanticVersion::parse("one.two.three").is_err());
    }

    #[test]
    fn test_parse_config_version() {
        assert_eq!(
            parse_config_version("config_version = \"0.1.0\"\n[audio]\n")
                .unwrap()
                .as_deref(),
            Some("0.1.0")
        );
        assert_eq!(parse_config_version("# config_version = \"0.1.0\"").unwrap(), None);
        assert_eq!(
            parse_config_version("[audio]\nconfig_version = \"0.1.0\"").unwrap(),
            None
        );
        assert_eq!(parse_config_version("").unwrap(), None);
    }

    #[test]
    fn test_compare_with_current() {
        assert_eq!(
            compare_with_current(Some("0.1.0".into()), "0.2.0").unwrap(),
            SetupAction::Migrate {
                from: "0.1.0".into()
            }
        );
        assert_eq!(
            compare_with_current(Some("0.2.0".into()), "0.2.0").unwrap(),
            SetupAction::UpToDate
        );
        assert_eq!(
            compare_with_current(Some("9.0.0".into()), "0.2.0").unwrap(),
            SetupAction::UpToDate
        );
        assert!(matches!(
            compare_with_current(None, "0.2.0").unwrap(),
            SetupAction::Migrate { .. }
        ));
        assert!(compare_with_current(Some("latest".into()), "0.2.0").is_err());
    }

    #[test]
    fn test_with_current_version_keeps_settings() {
        let updated =
            with_current_version("config_version = \"0.0.1\"\n[display]\nrows = 16\n").unwrap();
        assert_eq!(
            parse_config_version(&updated).unwrap().as_deref(),
            Some(CURRENT_VERSION)
        );
        assert!(updated.contains("rows = 16"));
        assert_eq!(updated.matches("config_version").count(), 1);

        let unversioned = with_current_version("[audio]\ndevice = \"1\"").unwrap();
        assert!(unversioned.starts_with("config_version"));
        assert!(unversioned.contains("device = \"1\""));
    }
}
