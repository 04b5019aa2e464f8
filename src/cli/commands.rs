use crate::config::Settings;
use crate::core::RatioCalculator;
use crate::error::{RatioError, RatioResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::narrative::{ChatSession, GeminiClient, NarrativeClient};
use crate::types::{Analysis, AnalysisOptions, BaseSource, HeaderMode, TotalAssetsPolicy};
use crate::writer::{format_amount, format_fixed, format_ratio, render_context, NOT_AVAILABLE};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Profile selection shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Config file (default: ./ratio-forge.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Abort when no TOTAL ASSETS row exists
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Fall back to column sums when no TOTAL ASSETS row exists
    #[arg(long)]
    pub lenient: bool,

    /// Whether the first row is a header
    #[arg(long, value_enum)]
    pub header: Option<HeaderMode>,
}

impl ProfileArgs {
    fn policy(&self) -> Option<TotalAssetsPolicy> {
        if self.strict {
            Some(TotalAssetsPolicy::Strict)
        } else if self.lenient {
            Some(TotalAssetsPolicy::Lenient)
        } else {
            None
        }
    }

    /// Config file values with command-line overrides applied
    pub fn settings(&self) -> RatioResult<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(policy) = self.policy() {
            settings.profile.total_assets_policy = policy;
        }
        if let Some(header) = self.header {
            settings.profile.header = header;
        }
        Ok(settings)
    }
}

/// Narrative client overrides
#[derive(Args, Debug, Clone, Default)]
pub struct NarrativeArgs {
    /// API key for the text-generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name (default from config)
    #[arg(long)]
    pub model: Option<String>,
}

impl NarrativeArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(key) = &self.api_key {
            settings.narrative.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            settings.narrative.model = model.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal report
    #[default]
    Table,
    /// Plain Markdown document, as sent to the narrative model
    Markdown,
    /// JSON report
    Json,
}

/// Import a workbook and run the calculator
pub fn load_analysis(file: &Path, options: AnalysisOptions) -> RatioResult<Analysis> {
    let raw = ExcelImporter::new(file).import()?;
    debug!(rows = raw.len(), policy = %options.policy, "running calculator");
    RatioCalculator::new(options).analyze(&raw)
}

/// Execute the analyze command
pub fn analyze(file: PathBuf, profile: ProfileArgs, format: OutputFormat) -> RatioResult<()> {
    let settings = profile.settings()?;
    let analysis = load_analysis(&file, settings.profile.options())?;

    match format {
        OutputFormat::Markdown => print!("{}", render_context(&analysis)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Table => {
            println!("{}", "📊 Ratio Forge - Balance Sheet Analysis".bold().green());
            println!("   File: {}", file.display());
            println!("   Policy: {}\n", analysis.policy.to_string().bright_yellow());
            print_report(&analysis);
        }
    }
    Ok(())
}

fn pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}%", format_fixed(v)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn print_report(analysis: &Analysis) {
    let label_width = analysis
        .table
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(10, 48);
    let line_width = label_width + 5 * 17;

    println!("{}", "Growth & Asset Structure:".bold().cyan());
    println!("{}", "─".repeat(line_width));
    println!(
        "{:<label_width$} {:>16} {:>16} {:>16} {:>16} {:>16}",
        "Line item".bold(),
        "Prior".bold(),
        "Current".bold(),
        "Growth".bold(),
        "Prior share".bold(),
        "Current share".bold(),
    );
    println!("{}", "─".repeat(line_width));

    for row in &analysis.table.rows {
        let label: String = row.label.chars().take(label_width).collect();
        let growth = pct(row.growth_pct);
        let growth = match row.growth_pct {
            Some(g) if g < 0.0 => growth.red(),
            Some(g) if g > 0.0 => growth.green(),
            _ => growth.normal(),
        };
        let label = if row.key.is_some() {
            label.bright_blue().bold()
        } else {
            label.normal()
        };
        println!(
            "{:<label_width$} {:>16} {:>16} {:>16} {:>16} {:>16}",
            label,
            format_amount(row.prior_value),
            format_amount(row.current_value),
            growth,
            pct(row.prior_share_pct),
            pct(row.current_share_pct),
        );
    }
    println!("{}", "─".repeat(line_width));

    match analysis.base.source {
        BaseSource::LineItem { .. } => println!("   Shares relative to TOTAL ASSETS"),
        BaseSource::ColumnSum => println!(
            "   Shares relative to column sums ({} / {})",
            format_amount(analysis.base.prior),
            format_amount(analysis.base.current)
        ),
    }

    println!("\n{}", "Current Ratio:".bold().cyan());
    let liquidity = &analysis.liquidity;
    println!("   Prior period:   {}", format_ratio(liquidity.prior()).bold());
    let delta = liquidity
        .delta()
        .map(|d| {
            let text = format!("({}{})", if d >= 0.0 { "+" } else { "" }, format_fixed(d));
            if d < 0.0 {
                text.red()
            } else {
                text.green()
            }
        })
        .unwrap_or_else(|| "".normal());
    println!(
        "   Current period: {} {}",
        format_ratio(liquidity.current()).bold(),
        delta
    );

    if !analysis.warnings.is_empty() {
        println!();
        for warning in &analysis.warnings {
            println!("{} {}", "⚠️ ".yellow(), warning.to_string().yellow());
        }
    }
    println!();
}

/// Execute the export command
pub fn export(input: PathBuf, output: PathBuf, profile: ProfileArgs) -> RatioResult<()> {
    println!("{}", "📊 Ratio Forge - Excel Export".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let settings = profile.settings()?;
    let analysis = load_analysis(&input, settings.profile.options())?;
    ExcelExporter::new(&analysis).export(&output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!(
        "   {} line items, {} warning(s)\n",
        analysis.table.len(),
        analysis.warnings.len()
    );
    Ok(())
}

fn narrative_setup(
    file: &Path,
    profile: &ProfileArgs,
    narrative: &NarrativeArgs,
) -> RatioResult<(ChatSession, GeminiClient, tokio::runtime::Runtime)> {
    let mut settings = profile.settings()?;
    narrative.apply(&mut settings);
    settings.validate()?;

    let client = GeminiClient::new(&settings.narrative)?;
    let analysis = load_analysis(file, settings.profile.options())?;
    let runtime = tokio::runtime::Runtime::new()?;
    Ok((ChatSession::with_analysis(analysis), client, runtime))
}

/// Execute the commentary command
pub fn commentary(file: PathBuf, profile: ProfileArgs, narrative: NarrativeArgs) -> RatioResult<()> {
    let (session, client, runtime) = narrative_setup(&file, &profile, &narrative)?;

    println!("{}", "🤖 Ratio Forge - Narrative Commentary".bold().green());
    println!("   File: {}\n", file.display());

    let text = runtime.block_on(session.commentary(&client))?;
    println!("{}\n", text);
    Ok(())
}

/// Execute the chat command: one question per stdin line until EOF or `/exit`
pub fn chat(file: PathBuf, profile: ProfileArgs, narrative: NarrativeArgs) -> RatioResult<()> {
    let (mut session, client, runtime) = narrative_setup(&file, &profile, &narrative)?;

    println!("{}", "💬 Ratio Forge - Chat".bold().green());
    println!("   File: {}", file.display());
    println!("   Ask about any line item, growth rate or asset share. Type /exit to quit.\n");

    let stdin = io::stdin();
    chat_loop(
        &runtime,
        &mut session,
        &client,
        stdin.lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )?;

    println!("{}", format!("Session ended after {} messages", session.history.len()).dimmed());
    Ok(())
}

/// Question/answer loop over `input`, one question per line
///
/// Stops at EOF or `/exit` and skips blank lines. Narrative failures are
/// written to `errors` and the loop continues; any other error ends it.
pub fn chat_loop<R: BufRead, W: Write, E: Write>(
    runtime: &tokio::runtime::Runtime,
    session: &mut ChatSession,
    client: &dyn NarrativeClient,
    input: R,
    out: &mut W,
    errors: &mut E,
) -> RatioResult<()> {
    let mut lines = input.lines();
    loop {
        write!(out, "{} ", ">".bold().cyan())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "/exit" {
            break;
        }

        match runtime.block_on(session.ask(client, question)) {
            Ok(answer) => writeln!(out, "{}\n", answer)?,
            Err(RatioError::Narrative(msg)) => {
                writeln!(errors, "{} {}\n", "❌".red(), msg.red())?;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
