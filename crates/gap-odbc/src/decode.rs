//! Text table → typed query rows.

use gap_core::records::{CellCountRecord, GapStatus, NvcGroupRecord};

use crate::error::{QueryError, Result};
use crate::query::Table;

/// One row with its index, for error messages.
struct RowReader<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowReader<'a> {
    fn cell(&self, column: &str) -> Result<Option<&'a str>> {
        let idx = self.table.column_index(column)?;
        Ok(self.table.rows[self.row]
            .get(idx)
            .and_then(|c| c.as_deref()))
    }

    fn error(&self, column: &str, message: impl Into<String>) -> QueryError {
        QueryError::Decode {
            column: column.to_string(),
            row: self.row,
            message: message.into(),
        }
    }

    fn text(&self, column: &str) -> Result<String> {
        self.cell(column)?
            .map(str::to_string)
            .ok_or_else(|| self.error(column, "unexpected NULL"))
    }

    fn text_or_empty(&self, column: &str) -> Result<String> {
        Ok(self.cell(column)?.unwrap_or_default().to_string())
    }

    fn opt_text(&self, column: &str) -> Result<Option<String>> {
        Ok(self.cell(column)?.map(str::to_string))
    }

    fn opt_count(&self, column: &str) -> Result<Option<u64>> {
        match self.cell(column)? {
            None => Ok(None),
            Some(raw) => parse_count(raw)
                .map(Some)
                .ok_or_else(|| self.error(column, format!("not a cell count: {raw:?}"))),
        }
    }

    fn count(&self, column: &str) -> Result<u64> {
        self.opt_count(column)?
            .ok_or_else(|| self.error(column, "unexpected NULL"))
    }

    fn status(&self, column: &str) -> Result<GapStatus> {
        let raw = self.text(column)?;
        GapStatus::from_code(&raw).map_err(|e| self.error(column, e.to_string()))
    }
}

/// Non-negative integer count. SQL Server may render SUM results with a
/// trailing `.0` depending on the driver.
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    digits.parse().ok()
}

fn rows(table: &Table) -> impl Iterator<Item = RowReader<'_>> {
    (0..table.len()).map(move |row| RowReader { table, row })
}

pub fn cell_count_records(table: &Table) -> Result<Vec<CellCountRecord>> {
    rows(table)
        .map(|r| -> Result<CellCountRecord> {
            Ok(CellCountRecord {
                pad_status: r.status("PADStatus")?,
                manage_name: r.opt_text("ManageName")?,
                manage_type: r.text_or_empty("ManageType")?,
                nvc_class: r.opt_text("NVCClass")?,
                nvc_group: None,
                n_cells: r.count("nCells")?,
            })
        })
        .collect()
}

pub fn nvc_group_records(table: &Table) -> Result<Vec<NvcGroupRecord>> {
    rows(table)
        .map(|r| -> Result<NvcGroupRecord> {
            Ok(NvcGroupRecord {
                nvc_class: r.opt_text("NVCClass")?,
                nvc_group: r.text("NVCGroup")?,
                group_total_cells: r.count("nGroupTotalCells")?,
                status1: r.opt_count("1")?,
                status2: r.opt_count("2")?,
                status3: r.opt_count("3")?,
                status4: r.opt_count("4")?,
            })
        })
        .collect()
}
