//! Raw query rows and the PAD status codes they carry.
//!
//! Field names on the wire match the column aliases of the two analytic
//! queries (`PADStatus`, `ManageName`, `nCells`, ...), so the same structs
//! decode both database rows and offline JSON dumps.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{GapError, Result};
use crate::nvc::ClassLabeled;

/// Area of one raster cell in km² (30 m × 30 m).
pub const KM2_PER_CELL: f64 = 0.0009;

/// Convert a raster cell count to square kilometres.
#[inline]
pub fn cells_to_km2(n_cells: u64) -> f64 {
    n_cells as f64 * KM2_PER_CELL
}

// ── Status codes ──────────────────────────────────────────────────────────────

/// PAD-US GAP status: 1/2 protected, 3 multiple use, 4 unprotected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "StatusCode", into = "String")]
pub enum GapStatus {
    Status1,
    Status2,
    Status3,
    Status4,
}

impl GapStatus {
    pub const ALL: [GapStatus; 4] = [
        GapStatus::Status1,
        GapStatus::Status2,
        GapStatus::Status3,
        GapStatus::Status4,
    ];

    pub fn code(self) -> &'static str {
        match self {
            GapStatus::Status1 => "1",
            GapStatus::Status2 => "2",
            GapStatus::Status3 => "3",
            GapStatus::Status4 => "4",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "1" => Ok(GapStatus::Status1),
            "2" => Ok(GapStatus::Status2),
            "3" => Ok(GapStatus::Status3),
            "4" => Ok(GapStatus::Status4),
            other => Err(GapError::UnknownStatus(other.to_string())),
        }
    }

    /// Coarse protection grouping. `None` for status 4, which the
    /// management summary leaves out.
    pub fn protection_status(self) -> Option<ProtectionStatus> {
        match self {
            GapStatus::Status1 | GapStatus::Status2 => Some(ProtectionStatus::Protected),
            GapStatus::Status3 => Some(ProtectionStatus::MultipleUse),
            GapStatus::Status4 => None,
        }
    }
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<GapStatus> for String {
    fn from(status: GapStatus) -> Self {
        status.code().to_string()
    }
}

/// Status codes show up as text from the database and as either text or
/// integers in hand-written JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusCode {
    Text(String),
    Number(i64),
}

impl TryFrom<StatusCode> for GapStatus {
    type Error = GapError;

    fn try_from(raw: StatusCode) -> Result<Self> {
        match raw {
            StatusCode::Text(s) => GapStatus::from_code(&s),
            StatusCode::Number(n) => GapStatus::from_code(&n.to_string()),
        }
    }
}

/// Two-valued protection label used by the management summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtectionStatus {
    Protected,
    #[serde(rename = "Multiple Use")]
    MultipleUse,
}

impl ProtectionStatus {
    /// Pivot column order.
    pub const ALL: [ProtectionStatus; 2] = [ProtectionStatus::Protected, ProtectionStatus::MultipleUse];

    pub fn label(self) -> &'static str {
        match self {
            ProtectionStatus::Protected => "Protected",
            ProtectionStatus::MultipleUse => "Multiple Use",
        }
    }
}

impl fmt::Display for ProtectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Query rows ────────────────────────────────────────────────────────────────

fn null_as_empty<'de, D: serde::Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// One aggregated row of the management query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCountRecord {
    #[serde(rename = "PADStatus")]
    pub pad_status: GapStatus,
    /// NULL where PAD-US has no manager name.
    #[serde(rename = "ManageName", default)]
    pub manage_name: Option<String>,
    #[serde(rename = "ManageType", default, deserialize_with = "null_as_empty")]
    pub manage_type: String,
    #[serde(rename = "NVCClass", default)]
    pub nvc_class: Option<String>,
    #[serde(rename = "NVCGroup", default, skip_serializing_if = "Option::is_none")]
    pub nvc_group: Option<String>,
    #[serde(rename = "nCells")]
    pub n_cells: u64,
}

impl CellCountRecord {
    pub fn area_km2(&self) -> f64 {
        cells_to_km2(self.n_cells)
    }
}

/// One row of the NVC group query, pivoted on PAD status.
/// Status columns are NULL where a group has no cells of that status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NvcGroupRecord {
    #[serde(rename = "NVCClass", default)]
    pub nvc_class: Option<String>,
    #[serde(rename = "NVCGroup")]
    pub nvc_group: String,
    #[serde(rename = "nGroupTotalCells")]
    pub group_total_cells: u64,
    #[serde(rename = "1", default)]
    pub status1: Option<u64>,
    #[serde(rename = "2", default)]
    pub status2: Option<u64>,
    #[serde(rename = "3", default)]
    pub status3: Option<u64>,
    #[serde(rename = "4", default)]
    pub status4: Option<u64>,
}

impl NvcGroupRecord {
    /// Cell count for a status column, NULL read as zero.
    pub fn cells(&self, status: GapStatus) -> u64 {
        match status {
            GapStatus::Status1 => self.status1,
            GapStatus::Status2 => self.status2,
            GapStatus::Status3 => self.status3,
            GapStatus::Status4 => self.status4,
        }
        .unwrap_or(0)
    }
}

impl ClassLabeled for CellCountRecord {
    fn class_label(&self) -> Option<&str> {
        self.nvc_class.as_deref()
    }
}

impl ClassLabeled for NvcGroupRecord {
    fn class_label(&self) -> Option<&str> {
        self.nvc_class.as_deref()
    }
}

/// Read rows previously dumped as a JSON array.
pub fn read_json_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn area_is_cells_times_constant() {
        for n in [0u64, 1, 500, 1000, 123_456_789] {
            let km2 = cells_to_km2(n);
            assert_relative_eq!(km2, n as f64 * 0.0009);
            assert!(km2 >= 0.0);
        }
        assert_eq!(cells_to_km2(0), 0.0);
        assert!(cells_to_km2(1) > 0.0);
    }

    #[test]
    fn status_maps_to_protection() {
        assert_eq!(GapStatus::Status1.protection_status(), Some(ProtectionStatus::Protected));
        assert_eq!(GapStatus::Status2.protection_status(), Some(ProtectionStatus::Protected));
        assert_eq!(GapStatus::Status3.protection_status(), Some(ProtectionStatus::MultipleUse));
        assert_eq!(GapStatus::Status4.protection_status(), None);
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        assert!(matches!(GapStatus::from_code("5"), Err(GapError::UnknownStatus(c)) if c == "5"));
        assert!(GapStatus::from_code("").is_err());
        assert_eq!(GapStatus::from_code(" 3 ").unwrap(), GapStatus::Status3);
    }

    #[test]
    fn cell_count_row_decodes_text_and_numeric_status() {
        let json = r#"[
            {"PADStatus": "3", "ManageName": "Private", "ManageType": "Private",
             "NVCClass": "Forest & Woodland", "nCells": 1000},
            {"PADStatus": 1, "ManageName": "Private",
             "NVCClass": "Forest & Woodland", "nCells": 500}
        ]"#;
        let rows: Vec<CellCountRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].pad_status, GapStatus::Status3);
        assert_eq!(rows[1].pad_status, GapStatus::Status1);
        assert_eq!(rows[1].manage_type, "");
        assert!(rows[1].nvc_group.is_none());
        assert_relative_eq!(rows[0].area_km2(), 0.9);
    }

    #[test]
    fn cell_count_row_rejects_bad_status() {
        let json = r#"{"PADStatus": "9", "ManageName": "Private",
                       "NVCClass": "Forest & Woodland", "nCells": 1}"#;
        assert!(serde_json::from_str::<CellCountRecord>(json).is_err());
    }

    #[test]
    fn group_row_null_status_reads_as_zero() {
        let json = r#"{"NVCClass": "Desert & Semi-Desert", "NVCGroup": "G1",
                       "nGroupTotalCells": 1000, "1": 100, "2": null, "3": 200}"#;
        let row: NvcGroupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(row.cells(GapStatus::Status1), 100);
        assert_eq!(row.cells(GapStatus::Status2), 0);
        assert_eq!(row.cells(GapStatus::Status3), 200);
        assert_eq!(row.cells(GapStatus::Status4), 0);
    }

    #[test]
    fn read_json_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(
            &path,
            r#"[{"PADStatus": "2", "ManageName": "Forest Service",
                 "NVCClass": "Open Rock Vegetation", "nCells": 10}]"#,
        )
        .unwrap();
        let rows: Vec<CellCountRecord> = read_json_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].manage_name.as_deref(), Some("Forest Service"));
    }

    #[test]
    fn null_owner_and_class_decode_as_none() {
        let json = r#"[
            {"PADStatus": "1", "ManageName": "Forest Service",
             "NVCClass": "Forest & Woodland", "nCells": 10},
            {"PADStatus": "2", "ManageName": null, "ManageType": null,
             "NVCClass": "Open Water", "nCells": 5},
            {"PADStatus": "3", "ManageName": "Private", "NVCClass": null, "nCells": 7}
        ]"#;
        let rows: Vec<CellCountRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].manage_name, None);
        assert_eq!(rows[2].nvc_class, None);
        assert_eq!(rows[2].class_label(), None);
        assert_eq!(rows[1].manage_type, "");

        let group: NvcGroupRecord = serde_json::from_str(
            r#"{"NVCClass": null, "NVCGroup": "G", "nGroupTotalCells": 4}"#,
        )
        .unwrap();
        assert_eq!(group.class_label(), None);
    }
}
