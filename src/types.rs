use crate::core::labels::{LabelIndex, LineKey};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

//==============================================================================
// Raw input
//==============================================================================

/// A single spreadsheet cell as handed over by the ingestion layer
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// True when the cell holds a native number (not numeric-looking text)
    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    /// True when the cell holds non-blank text
    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(s) if !s.trim().is_empty())
    }

    /// Convert a JSON value (API payloads) to a cell
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Empty,
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Rows of cells exactly as read from the source, row 0 possibly a header
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a raw table from JSON rows (`[["TOTAL ASSETS", 100, 150], ...]`)
    pub fn from_json_rows(rows: &[Vec<serde_json::Value>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(Cell::from_json).collect())
                .collect(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Width of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//==============================================================================
// Statement tables
//==============================================================================

/// A row after column normalization: label plus the two raw value cells
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub label: String,
    pub prior: Cell,
    pub current: Cell,
}

/// Three-column table with canonical roles (label, prior value, current value)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementTable {
    pub rows: Vec<StatementRow>,
}

/// One balance-sheet line with its derived columns
///
/// Derived columns are `None` until the corresponding calculator step ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRow {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<LineKey>,
    pub prior_value: f64,
    pub current_value: f64,
    pub growth_pct: Option<f64>,
    pub prior_share_pct: Option<f64>,
    pub current_share_pct: Option<f64>,
}

impl FinancialRow {
    pub fn new(label: impl Into<String>, prior_value: f64, current_value: f64) -> Self {
        Self {
            label: label.into(),
            key: None,
            prior_value,
            current_value,
            growth_pct: None,
            prior_share_pct: None,
            current_share_pct: None,
        }
    }
}

/// Ordered line items plus the canonical label index built at ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialTable {
    pub rows: Vec<FinancialRow>,
    #[serde(skip)]
    index: LabelIndex,
}

impl FinancialTable {
    /// Build a table and its label index in one pass
    pub fn new(mut rows: Vec<FinancialRow>) -> Self {
        let index = LabelIndex::build(&mut rows);
        Self { rows, index }
    }

    /// First row carrying the given canonical key
    pub fn find(&self, key: LineKey) -> Option<&FinancialRow> {
        self.position(key).map(|(_, row)| row)
    }

    /// Like [`find`](Self::find), with the row's position
    ///
    /// Returns `None` when `rows` was edited after the index was built and the
    /// recorded position no longer holds a row with this key.
    pub fn position(&self, key: LineKey) -> Option<(usize, &FinancialRow)> {
        let i = self.index.get(key)?;
        self.rows
            .get(i)
            .filter(|row| row.key == Some(key))
            .map(|row| (i, row))
    }

    pub fn index(&self) -> &LabelIndex {
        &self.index
    }

    /// Rebuild the label index from the current rows
    pub fn reindex(self) -> Self {
        Self::new(self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn prior_sum(&self) -> f64 {
        self.rows.iter().map(|r| r.prior_value).sum()
    }

    pub fn current_sum(&self) -> f64 {
        self.rows.iter().map(|r| r.current_value).sum()
    }
}

//==============================================================================
// Policies
//==============================================================================

/// What to do when no TOTAL ASSETS row exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TotalAssetsPolicy {
    /// Abort with a missing line item error
    Strict,
    /// Fall back to column sums and warn (may double-count subtotals)
    #[default]
    Lenient,
}

impl fmt::Display for TotalAssetsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalAssetsPolicy::Strict => write!(f, "strict"),
            TotalAssetsPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Whether row 0 of the raw table is a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Header when neither value cell of row 0 is a number and one holds text
    #[default]
    Auto,
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub policy: TotalAssetsPolicy,
    #[serde(default)]
    pub header: HeaderMode,
}

//==============================================================================
// Results
//==============================================================================

/// Where the share denominators came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseSource {
    /// The TOTAL ASSETS row at this index
    LineItem { row: usize },
    /// Column sums (lenient fallback)
    ColumnSum,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalAssetsBase {
    pub prior: f64,
    pub current: f64,
    pub source: BaseSource,
}

/// One period's current ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioValue {
    Finite(f64),
    /// Short-term liabilities were exactly zero
    Infinite,
}

impl RatioValue {
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            RatioValue::Finite(v) => Some(*v),
            RatioValue::Infinite => None,
        }
    }
}

impl fmt::Display for RatioValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioValue::Finite(v) => write!(f, "{:.2}", v),
            RatioValue::Infinite => write!(f, "inf"),
        }
    }
}

impl Serialize for RatioValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RatioValue::Finite(v) => serializer.serialize_f64(*v),
            RatioValue::Infinite => serializer.serialize_str("inf"),
        }
    }
}

/// Current (liquidity) ratio for both periods
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Liquidity {
    Available {
        prior: RatioValue,
        current: RatioValue,
    },
    Unavailable {
        missing: Vec<LineKey>,
    },
}

impl Liquidity {
    pub fn is_available(&self) -> bool {
        matches!(self, Liquidity::Available { .. })
    }

    pub fn prior(&self) -> Option<RatioValue> {
        match self {
            Liquidity::Available { prior, .. } => Some(*prior),
            Liquidity::Unavailable { .. } => None,
        }
    }

    pub fn current(&self) -> Option<RatioValue> {
        match self {
            Liquidity::Available { current, .. } => Some(*current),
            Liquidity::Unavailable { .. } => None,
        }
    }

    /// Change from prior to current, only when both periods are finite
    pub fn delta(&self) -> Option<f64> {
        let prior = self.prior()?.as_finite()?;
        let current = self.current()?.as_finite()?;
        Some(current - prior)
    }
}

/// Non-fatal conditions raised while analyzing a table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    TotalAssetsFallback,
    LiquidityUnavailable { missing: Vec<LineKey> },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::TotalAssetsFallback => write!(
                f,
                "No 'TOTAL ASSETS' row found; shares are computed against column sums, \
                 which is an approximation that may double-count subtotal rows"
            ),
            AnalysisWarning::LiquidityUnavailable { missing } => {
                let names: Vec<&str> = missing.iter().map(|k| k.canonical_label()).collect();
                write!(
                    f,
                    "Missing {} row(s); current ratio is not available",
                    names.join(" / ")
                )
            }
        }
    }
}

/// Output of the full calculator pipeline for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub policy: TotalAssetsPolicy,
    pub table: FinancialTable,
    pub base: TotalAssetsBase,
    pub liquidity: Liquidity,
    pub warnings: Vec<AnalysisWarning>,
}

impl Analysis {
    pub fn used_fallback(&self) -> bool {
        self.warnings.contains(&AnalysisWarning::TotalAssetsFallback)
    }
}
