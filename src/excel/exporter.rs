//! Excel exporter - analysis → .xlsx

use crate::error::{RatioError, RatioResult};
use crate::types::{Analysis, Liquidity};
use crate::writer::{format_ratio, NOT_AVAILABLE, TABLE_HEADERS};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn export_err(context: &str) -> impl Fn(XlsxError) -> RatioError + '_ {
    move |e| RatioError::Export(format!("{}: {}", context, e))
}

/// Writes an [`Analysis`] to a workbook with an "Analysis" and a "Ratios" sheet
pub struct ExcelExporter<'a> {
    analysis: &'a Analysis,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }

    /// Export to an .xlsx file
    pub fn export(&self, output_path: &Path) -> RatioResult<()> {
        let mut workbook = Workbook::new();

        self.export_table(workbook.add_worksheet())?;
        self.export_ratios(workbook.add_worksheet())?;

        workbook
            .save(output_path)
            .map_err(export_err("Failed to save Excel file"))?;
        Ok(())
    }

    fn export_table(&self, worksheet: &mut Worksheet) -> RatioResult<()> {
        let header = Format::new().set_bold();
        let amount = Format::new().set_num_format("#,##0");
        let percent = Format::new().set_num_format("0.00");

        worksheet
            .set_name("Analysis")
            .map_err(export_err("Failed to set worksheet name"))?;

        for (col, title) in TABLE_HEADERS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *title, &header)
                .map_err(export_err("Failed to write header"))?;
        }
        worksheet
            .set_column_width(0, 40.0)
            .map_err(export_err("Failed to size column"))?;

        for (idx, row) in self.analysis.table.rows.iter().enumerate() {
            let r = idx as u32 + 1;
            worksheet
                .write_string(r, 0, &row.label)
                .map_err(export_err("Failed to write label"))?;
            worksheet
                .write_number_with_format(r, 1, row.prior_value, &amount)
                .map_err(export_err("Failed to write value"))?;
            worksheet
                .write_number_with_format(r, 2, row.current_value, &amount)
                .map_err(export_err("Failed to write value"))?;

            let derived = [row.growth_pct, row.prior_share_pct, row.current_share_pct];
            for (offset, value) in derived.into_iter().enumerate() {
                let col = 3 + offset as u16;
                match value {
                    Some(v) => worksheet.write_number_with_format(r, col, v, &percent),
                    None => worksheet.write_string(r, col, NOT_AVAILABLE),
                }
                .map_err(export_err("Failed to write derived value"))?;
            }
        }
        Ok(())
    }

    fn export_ratios(&self, worksheet: &mut Worksheet) -> RatioResult<()> {
        let header = Format::new().set_bold();
        let liquidity: &Liquidity = &self.analysis.liquidity;

        worksheet
            .set_name("Ratios")
            .map_err(export_err("Failed to set worksheet name"))?;
        worksheet
            .write_string_with_format(0, 0, "Metric", &header)
            .map_err(export_err("Failed to write header"))?;
        worksheet
            .write_string_with_format(0, 1, "Value", &header)
            .map_err(export_err("Failed to write header"))?;
        worksheet
            .set_column_width(0, 32.0)
            .map_err(export_err("Failed to size column"))?;

        let rows = [
            ("Current ratio (prior period)", liquidity.prior()),
            ("Current ratio (current period)", liquidity.current()),
        ];
        for (idx, (name, value)) in rows.into_iter().enumerate() {
            let r = idx as u32 + 1;
            worksheet
                .write_string(r, 0, name)
                .map_err(export_err("Failed to write metric"))?;
            match value.and_then(|v| v.as_finite()) {
                Some(v) => worksheet.write_number(r, 1, v),
                None => worksheet.write_string(r, 1, format_ratio(value)),
            }
            .map_err(export_err("Failed to write metric value"))?;
        }

        let note_row = rows.len() as u32 + 2;
        for (offset, warning) in self.analysis.warnings.iter().enumerate() {
            worksheet
                .write_string(note_row + offset as u32, 0, warning.to_string())
                .map_err(export_err("Failed to write note"))?;
        }
        Ok(())
    }
}
