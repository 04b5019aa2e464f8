//! Ratio Forge - balance-sheet ratio analysis
//!
//! Takes a two-period table of balance-sheet line items (label, prior value,
//! current value) and computes growth rates, composition shares against
//! TOTAL ASSETS, and the current ratio. The calculator in [`core`] is a pure
//! transform; spreadsheet I/O, rendering, the HTTP API and the narrative
//! client are layered around it.
//!
//! # Example
//!
//! ```
//! use ratio_forge::core::analyze;
//! use ratio_forge::types::{AnalysisOptions, Cell, RawTable};
//!
//! let raw = RawTable::new(vec![
//!     vec![Cell::from("TOTAL ASSETS"), Cell::from(100.0), Cell::from(150.0)],
//!     vec![Cell::from("SHORT-TERM ASSETS"), Cell::from(40.0), Cell::from(90.0)],
//!     vec![Cell::from("SHORT-TERM LIABILITIES"), Cell::from(20.0), Cell::from(30.0)],
//! ]);
//!
//! let analysis = analyze(&raw, AnalysisOptions::default())?;
//! assert_eq!(analysis.table.rows[0].growth_pct, Some(50.0));
//! assert_eq!(analysis.liquidity.delta(), Some(1.0));
//! # Ok::<(), ratio_forge::error::RatioError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod logging;
pub mod narrative;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{RatioError, RatioResult};
pub use types::{Analysis, AnalysisOptions, Cell, FinancialRow, FinancialTable, RawTable};
