//! Financial ratio calculator
//!
//! Pure transforms from a raw two-period table to growth, composition and
//! current-ratio figures. Nothing in here performs I/O, and every value-level
//! anomaly (unparsable cell, zero denominator, missing optional line) is
//! repaired locally instead of failing the table.

use crate::core::labels::LineKey;
use crate::error::{RatioError, RatioResult};
use crate::types::{
    Analysis, AnalysisOptions, AnalysisWarning, BaseSource, Cell, FinancialRow, FinancialTable,
    HeaderMode, Liquidity, RatioValue, RawTable, StatementRow, StatementTable, TotalAssetsBase,
    TotalAssetsPolicy,
};
use tracing::{debug, warn};

/// Substitute for a zero denominator in growth and share calculations
pub const NEGLIGIBLE: f64 = 1e-9;

/// Returns `x` unless it is zero, in which case [`NEGLIGIBLE`]
#[must_use]
pub fn safe_div(x: f64) -> f64 {
    if x != 0.0 {
        x
    } else {
        NEGLIGIBLE
    }
}

/// Clamp overflowed results to the largest finite value of the same sign
fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else if v.is_nan() {
        0.0
    } else {
        f64::MAX.copysign(v)
    }
}

fn percent_of(value: f64, base: f64) -> f64 {
    finite(value / safe_div(base) * 100.0)
}

//==============================================================================
// Pipeline steps
//==============================================================================

/// Keep the first three columns as (label, prior value, current value)
///
/// Rows shorter than three cells are padded with empty cells and rows that
/// are entirely empty are dropped.
pub fn normalize_columns(raw: &RawTable, header: HeaderMode) -> RatioResult<StatementTable> {
    let width = raw.width();
    if width < 3 {
        return Err(RatioError::Structure { found: width });
    }

    let skip = match header {
        HeaderMode::Present => 1,
        HeaderMode::Absent => 0,
        HeaderMode::Auto => usize::from(raw.rows.first().is_some_and(|row| looks_like_header(row))),
    };

    let rows: Vec<StatementRow> = raw
        .rows
        .iter()
        .skip(skip)
        .filter(|row| row.iter().take(3).any(|c| *c != Cell::Empty))
        .map(|row| {
            let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
            StatementRow {
                label: cell(0).to_string().trim().to_string(),
                prior: cell(1),
                current: cell(2),
            }
        })
        .collect();

    debug!(rows = rows.len(), skipped_header = (skip == 1), "normalized columns");
    Ok(StatementTable { rows })
}

/// Row 0 is a header when its value cells are text that is not an amount
///
/// Numeric text such as `"100"` is data. The one exception is a pair of
/// period labels (`"2023"`, `"2024"`): both value cells are whole years and
/// the label names no canonical line item.
fn looks_like_header(row: &[Cell]) -> bool {
    let label = row.first().cloned().unwrap_or_default();
    let prior = row.get(1).cloned().unwrap_or_default();
    let current = row.get(2).cloned().unwrap_or_default();

    if prior.is_number() || current.is_number() || !(prior.is_text() || current.is_text()) {
        return false;
    }
    if parse_text(&prior).is_none() && parse_text(&current).is_none() {
        return true;
    }
    is_period_label(&prior)
        && is_period_label(&current)
        && LineKey::classify(&label.to_string()).is_none()
}

fn parse_text(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn is_period_label(cell: &Cell) -> bool {
    parse_text(cell).is_some_and(|v| v.fract() == 0.0 && (1900.0..=2100.0).contains(&v))
}

/// Numeric value of a cell; anything unparsable or non-finite is 0
#[must_use]
pub fn coerce_cell(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(_) => parse_text(cell).unwrap_or(0.0),
        Cell::Bool(true) => 1.0,
        Cell::Bool(false) | Cell::Empty => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parse the value columns and build the label index
pub fn coerce_numeric(table: StatementTable) -> FinancialTable {
    let rows = table
        .rows
        .into_iter()
        .map(|row| FinancialRow::new(row.label, coerce_cell(&row.prior), coerce_cell(&row.current)))
        .collect();
    FinancialTable::new(rows)
}

/// `growth_pct = (current - prior) / safe_div(prior) * 100` for every row
pub fn compute_growth(mut table: FinancialTable) -> FinancialTable {
    for row in &mut table.rows {
        let change = finite(row.current_value - row.prior_value);
        row.growth_pct = Some(percent_of(change, row.prior_value));
    }
    table
}

/// Denominators for the composition shares
///
/// Uses the first TOTAL ASSETS row. Without one, `Strict` fails and `Lenient`
/// sums each value column, which double-counts any subtotal rows present.
pub fn compute_total_assets_base(
    table: &FinancialTable,
    policy: TotalAssetsPolicy,
) -> RatioResult<TotalAssetsBase> {
    if let Some((row, total)) = table.position(LineKey::TotalAssets) {
        return Ok(TotalAssetsBase {
            prior: total.prior_value,
            current: total.current_value,
            source: BaseSource::LineItem { row },
        });
    }

    match policy {
        TotalAssetsPolicy::Strict => Err(RatioError::MissingLineItem {
            label: LineKey::TotalAssets.canonical_label().to_string(),
        }),
        TotalAssetsPolicy::Lenient => {
            warn!("no TOTAL ASSETS row; using column sums as share base (approximation, may double-count subtotals)");
            Ok(TotalAssetsBase {
                prior: finite(table.prior_sum()),
                current: finite(table.current_sum()),
                source: BaseSource::ColumnSum,
            })
        }
    }
}

/// Each row's value as a percentage of the period total
pub fn compute_shares(mut table: FinancialTable, prior_total: f64, current_total: f64) -> FinancialTable {
    for row in &mut table.rows {
        row.prior_share_pct = Some(percent_of(row.prior_value, prior_total));
        row.current_share_pct = Some(percent_of(row.current_value, current_total));
    }
    table
}

/// Current ratio (short-term assets / short-term liabilities) for both periods
pub fn compute_liquidity_ratio(table: &FinancialTable) -> Liquidity {
    let assets = table.find(LineKey::ShortTermAssets);
    let liabilities = table.find(LineKey::ShortTermLiabilities);

    match (assets, liabilities) {
        (Some(a), Some(l)) => Liquidity::Available {
            prior: period_ratio(a.prior_value, l.prior_value),
            current: period_ratio(a.current_value, l.current_value),
        },
        _ => {
            let missing: Vec<LineKey> = [LineKey::ShortTermAssets, LineKey::ShortTermLiabilities]
                .into_iter()
                .filter(|k| table.find(*k).is_none())
                .collect();
            Liquidity::Unavailable { missing }
        }
    }
}

fn period_ratio(assets: f64, liabilities: f64) -> RatioValue {
    if liabilities == 0.0 {
        RatioValue::Infinite
    } else {
        RatioValue::Finite(finite(assets / liabilities))
    }
}

//==============================================================================
// Full pipeline
//==============================================================================

/// Runs every step of the calculator under one set of options
pub struct RatioCalculator {
    options: AnalysisOptions,
}

impl RatioCalculator {
    #[must_use]
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> AnalysisOptions {
        self.options
    }

    /// Analyze a raw table
    pub fn analyze(&self, raw: &RawTable) -> RatioResult<Analysis> {
        let statement = normalize_columns(raw, self.options.header)?;
        self.analyze_table(coerce_numeric(statement))
    }

    /// Analyze an already-coerced table
    ///
    /// The label index is rebuilt first, so rows edited by the caller are
    /// classified again.
    pub fn analyze_table(&self, table: FinancialTable) -> RatioResult<Analysis> {
        let mut warnings = Vec::new();

        let table = compute_growth(table.reindex());
        let base = compute_total_assets_base(&table, self.options.policy)?;
        if base.source == BaseSource::ColumnSum {
            warnings.push(AnalysisWarning::TotalAssetsFallback);
        }

        let table = compute_shares(table, base.prior, base.current);
        let liquidity = compute_liquidity_ratio(&table);
        if let Liquidity::Unavailable { missing } = &liquidity {
            warn!(?missing, "current ratio unavailable");
            warnings.push(AnalysisWarning::LiquidityUnavailable {
                missing: missing.clone(),
            });
        }

        debug!(
            rows = table.len(),
            policy = %self.options.policy,
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(Analysis {
            policy: self.options.policy,
            table,
            base,
            liquidity,
            warnings,
        })
    }
}

/// Convenience wrapper around [`RatioCalculator::analyze`]
pub fn analyze(raw: &RawTable, options: AnalysisOptions) -> RatioResult<Analysis> {
    RatioCalculator::new(options).analyze(raw)
}
