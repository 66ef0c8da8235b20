//! Percent-protected summaries per NVC group, binned per NVC class.

use std::fmt;

use tracing::{debug, info};

use crate::error::{GapError, Result};
use crate::nvc::{retain_natural_classes, ClassLabeled, NvcClass};
use crate::records::{cells_to_km2, GapStatus, NvcGroupRecord};

/// Protection figures for one NVC group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupProtection {
    pub nvc_class: Option<String>,
    pub nvc_group: String,
    pub group_total_cells: u64,
    /// Cells per GAP status 1-4. Status 4 is whatever status 1-3 leave of
    /// the group total.
    pub cells: [u64; 4],
    pub area_km2: [f64; 4],
    pub pct_protected_1_2: f64,
    pub pct_protected_1_2_3: f64,
}

impl ClassLabeled for GroupProtection {
    fn class_label(&self) -> Option<&str> {
        self.nvc_class.as_deref()
    }
}

/// `part / total × 100`, 0 for an empty group.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn group_protection(record: &NvcGroupRecord) -> Result<GroupProtection> {
    let s1 = record.cells(GapStatus::Status1);
    let s2 = record.cells(GapStatus::Status2);
    let s3 = record.cells(GapStatus::Status3);
    let total = record.group_total_cells;
    let inconsistent = |assigned| GapError::InconsistentGroupTotal {
        group: record.nvc_group.clone(),
        total,
        assigned,
    };
    let assigned = s1
        .checked_add(s2)
        .and_then(|s| s.checked_add(s3))
        .ok_or_else(|| inconsistent(u64::MAX))?;
    let s4 = total
        .checked_sub(assigned)
        .ok_or_else(|| inconsistent(assigned))?;
    let cells = [s1, s2, s3, s4];
    Ok(GroupProtection {
        nvc_class: record.nvc_class.clone(),
        nvc_group: record.nvc_group.clone(),
        group_total_cells: total,
        cells,
        area_km2: cells.map(cells_to_km2),
        pct_protected_1_2: percent_of(s1 + s2, total),
        pct_protected_1_2_3: percent_of(assigned, total),
    })
}

pub fn group_protections(records: &[NvcGroupRecord]) -> Result<Vec<GroupProtection>> {
    records.iter().map(group_protection).collect()
}

// ── Percent measures ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PercentMeasure {
    Protected12,
    Protected123,
}

impl PercentMeasure {
    pub const ALL: [PercentMeasure; 2] = [PercentMeasure::Protected12, PercentMeasure::Protected123];

    pub fn label(self) -> &'static str {
        match self {
            PercentMeasure::Protected12 => "% Protected 1 & 2",
            PercentMeasure::Protected123 => "% Protected 1, 2 & 3",
        }
    }

    pub fn value(self, group: &GroupProtection) -> f64 {
        match self {
            PercentMeasure::Protected12 => group.pct_protected_1_2,
            PercentMeasure::Protected123 => group.pct_protected_1_2_3,
        }
    }
}

/// Long-form (class, measure, value) row for the box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentObservation {
    pub class: NvcClass,
    pub measure: PercentMeasure,
    pub value: f64,
}

/// Melt both percent columns into observations, all 1&2 values first.
pub fn melt_percentages(groups: &[(NvcClass, GroupProtection)]) -> Vec<PercentObservation> {
    PercentMeasure::ALL
        .into_iter()
        .flat_map(|measure| {
            groups.iter().map(move |(class, g)| PercentObservation {
                class: *class,
                measure,
                value: measure.value(g),
            })
        })
        .collect()
}

// ── Protection bins ───────────────────────────────────────────────────────────

/// Share of a group in GAP status 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtectionBin {
    Below1,
    From1To17,
    From17To50,
    Above50,
}

impl ProtectionBin {
    pub const ALL: [ProtectionBin; 4] = [
        ProtectionBin::Below1,
        ProtectionBin::From1To17,
        ProtectionBin::From17To50,
        ProtectionBin::Above50,
    ];

    /// Lower edges are inclusive: 1.0 → 1-17%, 17.0 → 17-50%, 50.0 → 17-50%.
    pub fn classify(pct: f64) -> Self {
        if pct < 1.0 {
            ProtectionBin::Below1
        } else if pct < 17.0 {
            ProtectionBin::From1To17
        } else if pct <= 50.0 {
            ProtectionBin::From17To50
        } else {
            ProtectionBin::Above50
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProtectionBin::Below1 => "< 1%",
            ProtectionBin::From1To17 => "1-17%",
            ProtectionBin::From17To50 => "17-50%",
            ProtectionBin::Above50 => "> 50%",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProtectionBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Group counts per protection bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinCounts {
    counts: [usize; 4],
}

impl BinCounts {
    pub fn from_percentages(pcts: impl IntoIterator<Item = f64>) -> Self {
        let mut out = Self::default();
        for pct in pcts {
            out.counts[ProtectionBin::classify(pct).index()] += 1;
        }
        out
    }

    pub fn get(&self, bin: ProtectionBin) -> usize {
        self.counts[bin.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin counts of `% Protected 1 & 2` for one NVC class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBinCounts {
    pub class: NvcClass,
    pub bins: BinCounts,
    pub n_groups: usize,
}

/// Per-class bin counts, classes in report order, absent classes skipped.
pub fn bin_counts_by_class(groups: &[(NvcClass, GroupProtection)]) -> Vec<ClassBinCounts> {
    NvcClass::ALL
        .into_iter()
        .filter_map(|class| {
            let pcts: Vec<f64> = groups
                .iter()
                .filter(|(c, _)| *c == class)
                .map(|(_, g)| g.pct_protected_1_2)
                .collect();
            if pcts.is_empty() {
                return None;
            }
            Some(ClassBinCounts {
                class,
                n_groups: pcts.len(),
                bins: BinCounts::from_percentages(pcts),
            })
        })
        .collect()
}

/// Output of the NVC protection pipeline.
#[derive(Debug, Clone)]
pub struct ProtectionSummary {
    /// Every group returned by the query, any class.
    pub groups: Vec<GroupProtection>,
    /// Bin counts over all groups.
    pub overall: BinCounts,
    /// Groups in the five natural classes.
    pub natural: Vec<(NvcClass, GroupProtection)>,
    pub by_class: Vec<ClassBinCounts>,
    pub observations: Vec<PercentObservation>,
}

impl ProtectionSummary {
    /// Groups of `class` whose `% Protected 1 & 2` falls in `bin`.
    pub fn count(&self, class: NvcClass, bin: ProtectionBin) -> usize {
        self.by_class
            .iter()
            .find(|c| c.class == class)
            .map_or(0, |c| c.bins.get(bin))
    }
}

pub fn summarize_protection(records: &[NvcGroupRecord]) -> Result<ProtectionSummary> {
    let groups = group_protections(records)?;
    let overall = BinCounts::from_percentages(groups.iter().map(|g| g.pct_protected_1_2));
    let natural = retain_natural_classes(groups.iter().cloned());
    let by_class = bin_counts_by_class(&natural);
    let observations = melt_percentages(&natural);
    debug!(observations = observations.len(), "melted percent columns");
    info!(
        groups = groups.len(),
        natural = natural.len(),
        classes = by_class.len(),
        "protection summary computed"
    );
    Ok(ProtectionSummary {
        groups,
        overall,
        natural,
        by_class,
        observations,
    })
}
