//! Application orchestration and command routing.
//!
//! Parses the command line and delegates to the command handlers.

use crate::commands::{self, RunOptions};
use crate::config::{config_path, DisplayMode};
use crate::logging;
use crate::setup;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Audio spectrum visualizer for LED matrices, emulated in the terminal
#[derive(Parser)]
#[command(name = "ledspec")]
#[command(version)]
#[command(about = "Audio spectrum visualizer for LED matrices, emulated in the terminal")]
#[command(long_about = "Audio spectrum visualizer for LED matrices, emulated in the terminal.\n\nCaptures audio, runs a fixed-point spectrum analysis with adaptive gain and\nlog-frequency bucketing, and lights a small LED matrix one column per bucket.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used. Run options can be given\n    without saying 'run'.\n\nEXAMPLES:\n    # Visualize the default microphone\n    $ ledspec\n\n    # Scrolling volume meter from device #2\n    $ ledspec --mode volume --device 2\n\n    # Demo with a 440Hz test tone\n    $ ledspec --tone 440\n\n    # Visualize a WAV file\n    $ ledspec run --wav song.wav\n\nKEYS:\n    Space to pause, q or Escape to quit.")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/ledspec/ledspec.toml\n    Logs:               ~/.local/state/ledspec/ledspec.log.*"
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// What to show: spectrum or volume
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<DisplayMode>,

    /// Analyze a synthetic tone of this frequency instead of audio input
    #[arg(short, long, value_name = "HZ", conflicts_with = "wav")]
    tone: Option<f32>,

    /// Analyze a WAV file, looped in real time
    #[arg(short, long, value_name = "FILE")]
    wav: Option<PathBuf>,

    /// Input device: "default", an ID or a name from list-devices
    #[arg(short, long, value_name = "NAME")]
    device: Option<String>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            mode: args.mode,
            tone: args.tone,
            wav: args.wav,
            device: args.device,
        }
    }
}

fn parse_mode(value: &str) -> Result<DisplayMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "spectrum" => Ok(DisplayMode::Spectrum),
        "volume" => Ok(DisplayMode::Volume),
        other => Err(format!("unknown mode '{other}', expected 'spectrum' or 'volume'")),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the visualizer (default)
    ///
    /// Space pauses the analysis, q, Escape or Ctrl+C quit.
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names and native formats, to help pick
    /// the input device in ledspec.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries
    ///
    /// Displays the last 50 lines of the most recent log file.
    Logs,

    /// Open the configuration file in your editor
    ///
    /// Uses $EDITOR, or falls back to nano or vi.
    #[command(visible_alias = "c")]
    Config,

    /// Generate a shell completion script
    ///
    /// Examples:
    ///   ledspec completions bash > ledspec.bash
    ///   ledspec completions zsh > _ledspec
    ///   ledspec completions fish > ledspec.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Installs or migrates the config file before any command reads it.
fn check_and_run_setup() -> anyhow::Result<()> {
    setup::ensure_config(&config_path()?)?;
    Ok(())
}

/// Runs the application for the current command line.
///
/// # Errors
/// - If logging initialization or setup fails
/// - If the command fails
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "ledspec", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;
    check_and_run_setup()?;

    match cli.command {
        None => commands::handle_run(cli.run.into()),
        Some(Commands::Run { args }) => commands::handle_run(args.into()),
        Some(Commands::Config) => commands::handle_config(),
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_without_subcommand() {
        let cli = Cli::try_parse_from(["ledspec", "--mode", "volume", "--tone", "440"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.mode, Some(DisplayMode::Volume));
        assert_eq!(cli.run.tone, Some(440.0));
    }

    #[test]
    fn test_run_subcommand_flags() {
        let cli = Cli::try_parse_from(["ledspec", "run", "--wav", "a.wav", "-d", "2"]).unwrap();
        let Some(Commands::Run { args }) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.wav, Some(PathBuf::from("a.wav")));
        assert_eq!(args.device.as_deref(), Some("2"));
    }

    #[test]
    fn test_rejects_tone_with_wav_and_unknown_mode() {
        assert!(Cli::try_parse_from(["ledspec", "--tone", "440", "--wav", "a.wav"]).is_err());
        assert!(Cli::try_parse_from(["ledspec", "--mode", "bars"]).is_err());
    }
}
