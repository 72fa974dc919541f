//! CLI argument definitions for kabuscore.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rate` | Fetch a security and rate its attractiveness |
//! | `quote` | Fetch a security's market and fundamental data |
//! | `score` | Rate ratios given on the command line (offline) |
//! | `health` | Check the stock API health endpoint |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--mock` | `false` | Use deterministic fixture data instead of the network |
//! | `--base-url` | config | Stock API root URL |
//! | `--timeout-ms` | config | Request timeout in ms |
//! | `--config` | none | TOML configuration file |
//! | `-v` | warn | Increase log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! kabuscore rate 7203 --format table
//! kabuscore quote 6758 --pretty
//! kabuscore score --per 8 --pbr 1.0 --roe 18 --dividend-yield 3.5
//! kabuscore --base-url http://localhost:5000 health
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Single-security attractiveness scoring for 4-digit stock codes.
#[derive(Debug, Parser)]
#[command(
    name = "kabuscore",
    author,
    version,
    about = "Rate a stock's attractiveness from its valuation ratios",
    long_about = "kabuscore fetches one security's market and fundamental data by its \
4-digit code and turns PER, PBR, ROE and dividend yield into a 0-100 score, \
a tier and a list of qualitative factors.\n\
\n\
Use 'kabuscore <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic fixture data; no network access.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Stock API root URL (overrides config and KABUSCORE_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds (overrides config and KABUSCORE_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a security and rate its attractiveness.
    ///
    /// # Examples
    ///
    ///   kabuscore rate 7203
    ///   kabuscore rate 7203 --format table
    Rate(CodeArgs),

    /// Fetch a security's market and fundamental data without rating it.
    ///
    /// # Examples
    ///
    ///   kabuscore quote 6758 --pretty
    Quote(CodeArgs),

    /// Rate ratios supplied on the command line. No network access.
    ///
    /// Omitted ratios are treated as unavailable.
    ///
    /// # Examples
    ///
    ///   kabuscore score --per 12 --roe 10
    Score(ScoreArgs),

    /// Check the stock API health endpoint.
    Health,
}

/// Arguments for commands that look up one security.
#[derive(Debug, Args)]
pub struct CodeArgs {
    /// 4-digit stock code (e.g., 7203).
    pub code: String,
}

/// Arguments for the `score` command.
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Price to earnings ratio.
    #[arg(long, allow_negative_numbers = true)]
    pub per: Option<f64>,

    /// Price to book ratio.
    #[arg(long, allow_negative_numbers = true)]
    pub pbr: Option<f64>,

    /// Return on equity, in percent.
    #[arg(long, allow_negative_numbers = true)]
    pub roe: Option<f64>,

    /// Dividend yield, in percent.
    #[arg(long, allow_negative_numbers = true)]
    pub dividend_yield: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kabuscore",
            "rate",
            "7203",
            "--format",
            "table",
            "--mock",
            "-vv",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.mock);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Rate(ref args) if args.code == "7203"));
    }

    #[test]
    fn score_accepts_negative_ratios() {
        let cli = Cli::try_parse_from(["kabuscore", "score", "--per", "-3", "--roe", "12.5"])
            .expect("valid arguments");

        let Command::Score(args) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.per, Some(-3.0));
        assert_eq!(args.roe, Some(12.5));
        assert_eq!(args.pbr, None);
    }
}
