//! haptic-test - exercise force feedback on Logitech wheels
//!
//! Opens a wheel over hidapi, drives it through the lg4ff haptic driver and
//! plays effects on it.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;
mod wheels;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;
use crate::wheels::Selector;

#[derive(Parser)]
#[command(name = "haptic-test")]
#[command(about = "Test force feedback on HIDAPI racing wheels")]
#[command(version)]
#[command(long_about = "
haptic-test opens a Logitech wheel directly over hidapi and renders effects
on it in software, the way the HIDAPI haptic driver does for games.

Without --device the first supported wheel is used.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Wheel to open, as VID:PID in hex
    #[arg(short, long, global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected wheels
    List,

    /// Show the capabilities of a wheel
    Info,

    /// Play one of each supported effect
    Demo {
        /// Length of each effect in milliseconds
        #[arg(long, default_value_t = 5000)]
        length: u32,

        /// Pause between effects in milliseconds
        #[arg(long, default_value_t = 500)]
        gap: u32,
    },

    /// Play an effect described in JSON
    Play {
        /// Effect JSON, or @path to a file holding it
        #[arg(short, long)]
        effect: String,

        /// Number of times to play the effect, 0 stops it
        #[arg(short, long, default_value_t = 1)]
        iterations: u32,

        /// Longest time to wait for the effect to finish, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        wait_ms: u64,
    },

    /// Play the simple rumble
    Rumble {
        /// Strength between 0.0 and 1.0
        #[arg(short, long, default_value_t = 0.5)]
        strength: f32,

        /// Length in milliseconds
        #[arg(short, long, default_value_t = 2000)]
        length: u32,
    },

    /// Set the autocenter strength
    Autocenter {
        /// Strength in percent, 0 disables autocenter
        #[arg(value_parser = clap::value_parser!(i32).range(0..=100))]
        value: i32,
    },

    /// Set the gain and feel it with a constant pulse
    Gain {
        /// Gain in percent
        #[arg(value_parser = clap::value_parser!(i32).range(0..=100))]
        value: i32,

        /// Length of the test pulse in milliseconds
        #[arg(long, default_value_t = 1000)]
        pulse_ms: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "haptic_test={level},hidhaptic={level},hidhaptic_lg4ff={level}",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = execute_command(&cli) {
        if cli.json {
            output::print_error_json(&e);
        } else {
            output::print_error_human(&e);
        }

        let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(exit_code);
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let selector = cli
        .device
        .as_deref()
        .map(str::parse::<Selector>)
        .transpose()?;

    match &cli.command {
        Commands::List => commands::device::list(cli.json),
        Commands::Info => commands::device::info(selector, cli.json),
        Commands::Demo { length, gap } => {
            commands::effect::demo(selector, *length, *gap, cli.json)
        }
        Commands::Play {
            effect,
            iterations,
            wait_ms,
        } => commands::effect::play(selector, effect, *iterations, *wait_ms, cli.json),
        Commands::Rumble { strength, length } => {
            commands::effect::rumble(selector, *strength, *length, cli.json)
        }
        Commands::Autocenter { value } => commands::control::autocenter(selector, *value, cli.json),
        Commands::Gain { value, pulse_ms } => {
            commands::control::gain(selector, *value, *pulse_ms, cli.json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_list_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["haptic-test", "list"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Commands::List));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["haptic-test", "info", "--json", "-d", "046d:c24f", "-vv"])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.device.as_deref(), Some("046d:c24f"));
        Ok(())
    }

    #[test]
    fn parse_play_options() -> TestResult {
        let cli = Cli::try_parse_from([
            "haptic-test",
            "play",
            "--effect",
            r#"{"type":"constant","level":100}"#,
            "-i",
            "3",
        ])?;
        match cli.command {
            Commands::Play {
                effect,
                iterations,
                wait_ms,
            } => {
                assert!(effect.contains("constant"));
                assert_eq!(iterations, 3);
                assert_eq!(wait_ms, 10_000);
            }
            _ => return Err("expected play".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_demo_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["haptic-test", "demo"])?;
        assert!(matches!(
            cli.command,
            Commands::Demo {
                length: 5000,
                gap: 500
            }
        ));
        Ok(())
    }

    #[test]
    fn reject_out_of_range_percent() {
        assert!(Cli::try_parse_from(["haptic-test", "gain", "101"]).is_err());
        assert!(Cli::try_parse_from(["haptic-test", "autocenter", "-5"]).is_err());
        assert!(Cli::try_parse_from(["haptic-test", "autocenter", "40"]).is_ok());
    }

    #[test]
    fn reject_missing_subcommand() {
        assert!(Cli::try_parse_from(["haptic-test"]).is_err());
    }
}
