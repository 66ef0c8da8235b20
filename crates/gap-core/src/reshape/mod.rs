//! Management summary reshaping.
//!
//! Stages, each a plain function over owned intermediate tables:
//!
//! 1. [`area_records`]: drop status 4, attach protection status and km².
//! 2. [`fill_missing_statuses`]: add zero rows so every (category, class)
//!    pair has both a Protected and a Multiple Use record.
//! 3. [`aggregate`]: sum km² by (category, class, status).
//! 4. [`pivot`]: one row per pair with Protected / Multiple Use / Total.
//! 5. [`sort_by_rank`]: order rows by [`order::ROW_ORDER`].
//!
//! [`summarize_management`] runs all five.

pub mod order;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::error::{GapError, Result};
use crate::management::{CategorizedRecord, ManagementCategory};
use crate::nvc::NvcClass;
use crate::records::ProtectionStatus;

/// A categorized row with its area attached. Status 4 rows never become
/// area records.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRecord {
    pub category: ManagementCategory,
    pub class: NvcClass,
    pub status: ProtectionStatus,
    pub area_km2: f64,
}

/// Summed area for one (category, class, status) key.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCell {
    pub category: ManagementCategory,
    pub class: NvcClass,
    pub status: ProtectionStatus,
    pub area_km2: f64,
}

/// One pivoted output row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: ManagementCategory,
    pub class: NvcClass,
    pub protected_km2: f64,
    pub multiple_use_km2: f64,
    pub total_km2: f64,
}

impl SummaryRow {
    pub fn area(&self, status: ProtectionStatus) -> f64 {
        match status {
            ProtectionStatus::Protected => self.protected_km2,
            ProtectionStatus::MultipleUse => self.multiple_use_km2,
        }
    }
}

pub fn area_records(records: &[CategorizedRecord]) -> Vec<AreaRecord> {
    let out: Vec<AreaRecord> = records
        .iter()
        .filter_map(|r| {
            let status = r.record.pad_status.protection_status()?;
            Some(AreaRecord {
                category: r.category,
                class: r.class,
                status,
                area_km2: r.record.area_km2(),
            })
        })
        .collect();
    debug!(
        kept = out.len(),
        unprotected = records.len() - out.len(),
        "dropped status 4 rows"
    );
    out
}

/// Append a zero-area record for every status a present (category, class)
/// pair lacks. Returns the number of records added.
pub fn fill_missing_statuses(records: &mut Vec<AreaRecord>) -> usize {
    let present: BTreeSet<(ManagementCategory, NvcClass, ProtectionStatus)> = records
        .iter()
        .map(|r| (r.category, r.class, r.status))
        .collect();
    let pairs: BTreeSet<(ManagementCategory, NvcClass)> =
        present.iter().map(|&(c, k, _)| (c, k)).collect();

    let before = records.len();
    for (category, class) in pairs {
        for status in ProtectionStatus::ALL {
            if !present.contains(&(category, class, status)) {
                debug!(%category, %class, %status, "synthesizing zero-area row");
                records.push(AreaRecord {
                    category,
                    class,
                    status,
                    area_km2: 0.0,
                });
            }
        }
    }
    records.len() - before
}

/// Sum area by (category, class, status). Output is sorted by key.
pub fn aggregate(records: &[AreaRecord]) -> Vec<SummaryCell> {
    let mut sums: BTreeMap<(ManagementCategory, NvcClass, ProtectionStatus), f64> = BTreeMap::new();
    for r in records {
        *sums.entry((r.category, r.class, r.status)).or_insert(0.0) += r.area_km2;
    }
    sums.into_iter()
        .map(|((category, class, status), area_km2)| SummaryCell {
            category,
            class,
            status,
            area_km2,
        })
        .collect()
}

/// Spread status into columns. Every pair must have both statuses.
pub fn pivot(cells: &[SummaryCell]) -> Result<Vec<SummaryRow>> {
    let mut by_pair: BTreeMap<(ManagementCategory, NvcClass), [Option<f64>; 2]> = BTreeMap::new();
    for cell in cells {
        let slot = match cell.status {
            ProtectionStatus::Protected => 0,
            ProtectionStatus::MultipleUse => 1,
        };
        let entry = by_pair.entry((cell.category, cell.class)).or_default();
        *entry[slot].get_or_insert(0.0) += cell.area_km2;
    }

    by_pair
        .into_iter()
        .map(|((category, class), [protected, multiple_use])| -> Result<SummaryRow> {
            let missing = |status| GapError::ShapeMismatch {
                category,
                class,
                status,
            };
            let protected_km2 = protected.ok_or_else(|| missing(ProtectionStatus::Protected))?;
            let multiple_use_km2 =
                multiple_use.ok_or_else(|| missing(ProtectionStatus::MultipleUse))?;
            Ok(SummaryRow {
                category,
                class,
                protected_km2,
                multiple_use_km2,
                total_km2: protected_km2 + multiple_use_km2,
            })
        })
        .collect()
}

/// Stable sort by row priority. Pairs without a rank keep their relative
/// order after all ranked pairs.
pub fn sort_by_rank(rows: &mut [SummaryRow]) {
    for row in rows.iter() {
        if order::rank(row.category, row.class).is_none() {
            warn!(category = %row.category, class = %row.class, "no display rank; placing last");
        }
    }
    rows.sort_by_key(|r| order::rank(r.category, r.class).unwrap_or(usize::MAX));
}

/// Result of the management reshaping pipeline.
#[derive(Debug, Clone)]
pub struct ManagementSummary {
    pub rows: Vec<SummaryRow>,
    /// Zero-area records added to make the pivot rectangular.
    pub synthesized: usize,
}

pub fn summarize_management(records: &[CategorizedRecord]) -> Result<ManagementSummary> {
    let mut areas = area_records(records);
    let synthesized = fill_missing_statuses(&mut areas);
    let cells = aggregate(&areas);
    let mut rows = pivot(&cells)?;
    sort_by_rank(&mut rows);
    info!(rows = rows.len(), synthesized, "management summary reshaped");
    Ok(ManagementSummary { rows, synthesized })
}
