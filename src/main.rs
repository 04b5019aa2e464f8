use clap::{Parser, Subcommand};
use colored::Colorize;
use ratio_forge::cli::{self, NarrativeArgs, OutputFormat, ProfileArgs};
use ratio_forge::error::RatioResult;
use ratio_forge::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ratio-forge")]
#[command(about = "Balance-sheet growth, composition and current ratio from a two-period spreadsheet.")]
#[command(long_about = "Ratio Forge - Balance sheet ratio analysis

Reads a spreadsheet with three columns (line item | prior period | current period)
and computes, for every line, the growth rate and its share of TOTAL ASSETS in
each period, plus the current ratio (short-term assets / short-term liabilities).

COMMANDS:
  analyze     - Compute and display the ratio table
  export      - Write the ratio table to Excel (.xlsx)
  commentary  - Ask a hosted model for a narrative assessment
  chat        - Ask follow-up questions about the table

POLICY:
  --strict    Abort when no TOTAL ASSETS row exists
  --lenient   Use column sums instead (approximation, may double-count subtotals)
  Default comes from ratio-forge.yaml (profile.total_assets_policy), else lenient.

EXAMPLES:
  ratio-forge analyze statement.xlsx
  ratio-forge analyze statement.xlsx --strict --format markdown
  ratio-forge export statement.xlsx analysis.xlsx
  GEMINI_API_KEY=... ratio-forge commentary statement.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute growth, shares and current ratio
    Analyze {
        /// Spreadsheet (.xlsx, .xls, .ods)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Export the analysis to Excel (.xlsx)
    Export {
        /// Spreadsheet (.xlsx, .xls, .ods)
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Narrative commentary on the analysis from a hosted model
    Commentary {
        /// Spreadsheet (.xlsx, .xls, .ods)
        file: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        narrative: NarrativeArgs,
    },

    /// Interactive follow-up questions (one per line, /exit to quit)
    Chat {
        /// Spreadsheet (.xlsx, .xls, .ods)
        file: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        narrative: NarrativeArgs,
    },
}

fn run(cli: Cli) -> RatioResult<()> {
    match cli.command {
        Commands::Analyze {
            file,
            format,
            profile,
        } => cli::analyze(file, profile, format),

        Commands::Export {
            input,
            output,
            profile,
        } => cli::export(input, output, profile),

        Commands::Commentary {
            file,
            profile,
            narrative,
        } => cli::commentary(file, profile, narrative),

        Commands::Chat {
            file,
            profile,
            narrative,
        } => cli::chat(file, profile, narrative),
    }
}

fn main() {
    logging::init("ratio_forge=warn");
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "❌ Error:".bold().red(), e);
        std::process::exit(1);
    }
}
