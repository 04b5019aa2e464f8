//! Ratio calculation engine and canonical label lookup

pub mod calculator;
pub mod labels;

pub use calculator::{
    analyze, coerce_cell, coerce_numeric, compute_growth, compute_liquidity_ratio, compute_shares,
    compute_total_assets_base, normalize_columns, safe_div, RatioCalculator, NEGLIGIBLE,
};
pub use labels::{normalize_label, LabelIndex, LineKey};
