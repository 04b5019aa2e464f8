//! Canonical line-item keys and the label index
//!
//! Labels are normalized once when a table is ingested: Unicode NFD with
//! combining marks removed, `Đ`/`đ` folded to `D`, every non-alphanumeric
//! character turned into a space, whitespace collapsed, uppercased. A row maps
//! to at most one [`LineKey`]: the first in [`LineKey::MATCH_ORDER`] whose
//! alias occurs in its normalized label as a whole-word run. The short-term
//! keys are tried before TOTAL ASSETS, so a subtotal such as
//! "Tổng cộng tài sản ngắn hạn" is short-term assets. The index keeps the
//! first row for each key.

use crate::types::FinancialRow;
use serde::Serialize;
use std::collections::BTreeMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Balance-sheet lines the calculator needs to find by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKey {
    TotalAssets,
    ShortTermAssets,
    ShortTermLiabilities,
}

impl LineKey {
    /// Lookup order when a label could match more than one key: most specific first
    pub const MATCH_ORDER: [LineKey; 3] = [
        LineKey::ShortTermLiabilities,
        LineKey::ShortTermAssets,
        LineKey::TotalAssets,
    ];

    /// Label used in messages and reports
    pub fn canonical_label(&self) -> &'static str {
        match self {
            LineKey::TotalAssets => "TOTAL ASSETS",
            LineKey::ShortTermAssets => "SHORT-TERM ASSETS",
            LineKey::ShortTermLiabilities => "SHORT-TERM LIABILITIES",
        }
    }

    /// Accepted spellings, already in normalized form
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            LineKey::TotalAssets => &["TOTAL ASSETS", "TONG CONG TAI SAN", "TONG TAI SAN"],
            LineKey::ShortTermAssets => &["SHORT TERM ASSETS", "TAI SAN NGAN HAN"],
            LineKey::ShortTermLiabilities => &["SHORT TERM LIABILITIES", "NO NGAN HAN"],
        }
    }

    /// Key for a raw label, if any
    pub fn classify(label: &str) -> Option<LineKey> {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return None;
        }
        let padded = format!(" {} ", normalized);
        Self::MATCH_ORDER.into_iter().find(|key| {
            key.aliases()
                .iter()
                .any(|alias| padded.contains(&format!(" {} ", alias)))
        })
    }
}

/// Normalize a label for matching
pub fn normalize_label(label: &str) -> String {
    let folded: String = label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'Đ' | 'đ' => 'D',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        })
        .collect();

    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// First row index per canonical key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelIndex {
    entries: BTreeMap<LineKey, usize>,
}

impl LabelIndex {
    /// Classify every row (setting `row.key`) and record first occurrences
    pub fn build(rows: &mut [FinancialRow]) -> Self {
        let mut entries = BTreeMap::new();
        for (i, row) in rows.iter_mut().enumerate() {
            row.key = LineKey::classify(&row.label);
            if let Some(key) = row.key {
                entries.entry(key).or_insert(i);
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: LineKey) -> Option<usize> {
        self.entries.get(&key).copied()
    }

    pub fn contains(&self, key: LineKey) -> bool {
        self.entries.contains_key(&key)
    }
}
