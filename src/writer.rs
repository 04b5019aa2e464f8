//! Plain-text renderings of an analysis
//!
//! Output here is consumed verbatim by the narrative collaborator, so column
//! order and number formatting are fixed: every number is printed with two
//! decimals and negative zero prints as `0.00`.

use crate::types::{Analysis, FinancialTable, Liquidity, RatioValue};

/// Column headers of the serialized table, in order
pub const TABLE_HEADERS: [&str; 6] = [
    "Line item",
    "Prior",
    "Current",
    "Growth (%)",
    "Prior share (%)",
    "Current share (%)",
];

/// Placeholder for a value that could not be computed
pub const NOT_AVAILABLE: &str = "N/A";

/// Two-decimal fixed formatting
pub fn format_fixed(value: f64) -> String {
    let s = format!("{:.2}", value);
    if s == "-0.00" {
        "0.00".to_string()
    } else {
        s
    }
}

/// Whole-number formatting with thousands separators (`1,234,567`)
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) if rest != "0" => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_fixed).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Current ratio for display: two decimals, `inf`, or `N/A`
pub fn format_ratio(value: Option<RatioValue>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Deterministic Markdown serialization of the analyzed table
pub fn render_markdown(table: &FinancialTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", TABLE_HEADERS.join(" | ")));
    out.push_str("|:---|---:|---:|---:|---:|---:|\n");

    for row in &table.rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&row.label),
            format_fixed(row.prior_value),
            format_fixed(row.current_value),
            format_optional(row.growth_pct),
            format_optional(row.prior_share_pct),
            format_optional(row.current_share_pct),
        ));
    }
    out
}

/// Current ratio section as a two-column Markdown table
pub fn render_liquidity(liquidity: &Liquidity) -> String {
    let mut out = String::from("| Metric | Value |\n|:---|---:|\n");
    out.push_str(&format!(
        "| Current ratio (prior period) | {} |\n",
        format_ratio(liquidity.prior())
    ));
    out.push_str(&format!(
        "| Current ratio (current period) | {} |\n",
        format_ratio(liquidity.current())
    ));
    out
}

/// Context document handed to the narrative collaborator
pub fn render_context(analysis: &Analysis) -> String {
    let mut out = String::from("## Balance sheet analysis\n\n");
    out.push_str(&render_markdown(&analysis.table));
    out.push_str("\n## Current ratio\n\n");
    out.push_str(&render_liquidity(&analysis.liquidity));

    if !analysis.warnings.is_empty() {
        out.push_str("\n## Notes\n\n");
        for warning in &analysis.warnings {
            out.push_str(&format!("- {}\n", warning));
        }
    }
    out
}
