//! The two analytic queries and text materialization of their results.

use odbc_api::buffers::TextRowSet;
use odbc_api::{Connection, Cursor, ResultSetMetadata};
use tracing::debug;

use crate::error::{QueryError, Result};

/// Cell counts by owner, owner type, PAD status and NVC class.
pub const MANAGEMENT_QUERY: &str = r"

SELECT
	padus1_4.gap_sts as PADStatus,
	padus1_4.d_mang_nam as ManageName,
	padus1_4.d_mang_typ as ManageType,
	gap_landfire.nvc_class as NVCClass,
	--gap_landfire.nvc_group as NVCGroup,
	sum(lu_boundary_gap_landfire.count) as nCells
FROM	lu_boundary INNER JOIN lu_boundary_gap_landfire INNER JOIN gap_landfire
	ON	lu_boundary_gap_landfire.gap_landfire = gap_landfire.value
	ON	lu_boundary.value = lu_boundary_gap_landfire.boundary INNER JOIN padus1_4
	ON	lu_boundary.padus1_4 = padus1_4.objectid
GROUP BY
  padus1_4.d_mang_nam,
  padus1_4.d_mang_typ,
  padus1_4.gap_sts,
  gap_landfire.nvc_class
  --gap_landfire.nvc_group

";

/// Per NVC group: total cells and cells per PAD status, pivoted to columns
/// `1`..`4`.
pub const NVC_GROUP_QUERY: &str = r"

WITH

NVC_GroupTotal AS (
SELECT
	gap_landfire.nvc_group,
	sum(lu_boundary_gap_landfire.count) as nGroupTotalCells
FROM	lu_boundary INNER JOIN lu_boundary_gap_landfire INNER JOIN gap_landfire
	ON		lu_boundary_gap_landfire.gap_landfire = gap_landfire.value
	ON		lu_boundary.value = lu_boundary_gap_landfire.boundary
GROUP BY
  gap_landfire.nvc_group

),


NVC_Group AS (
SELECT
	padus1_4.gap_sts as PADStatus,
	gap_landfire.nvc_class as NVCClass,
	gap_landfire.nvc_group as NVCGroup,
	sum(lu_boundary_gap_landfire.count) as nCells
FROM	lu_boundary INNER JOIN lu_boundary_gap_landfire INNER JOIN gap_landfire
	ON	lu_boundary_gap_landfire.gap_landfire = gap_landfire.value
	ON	lu_boundary.value = lu_boundary_gap_landfire.boundary INNER JOIN padus1_4
	ON	lu_boundary.padus1_4 = padus1_4.objectid
GROUP BY
  padus1_4.gap_sts,
  gap_landfire.nvc_class,
  gap_landfire.nvc_group

)

	SELECT *
	FROM
	(
	SELECT NVC_Group.PADStatus,
			NVC_Group.NVCClass,
			NVC_Group.NVCGroup,
			NVC_GroupTotal.nGroupTotalCells,
			NVC_Group.nCells
	FROM   NVC_GroupTotal INNER JOIN NVC_Group
	ON	   NVC_GroupTotal.nvc_group = NVC_Group.NVCGroup
	) AS NVC_Output

	PIVOT
	(
		MAX(NVC_Output.nCells)
		FOR NVC_Output.PADStatus IN ([1], [2], [3], [4])
	) piv
	ORDER BY NVCGroup

";

/// Rows fetched per round trip.
const BATCH_SIZE: usize = 5000;
/// Upper bound on a text cell; NVC group names are the longest values.
const MAX_TEXT_LEN: usize = 4096;

/// A result set with every cell as nullable text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Index of `name`, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .ok_or_else(|| QueryError::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run `sql` and read the whole result set as text.
pub fn fetch_table(conn: &Connection<'_>, sql: &str) -> Result<Table> {
    let mut prepared = conn.prepare(sql)?;
    let Some(mut cursor) = prepared.execute(())? else {
        return Ok(Table::default());
    };

    let columns = cursor
        .column_names()?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    let buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))?;
    let mut row_set_cursor = cursor.bind_buffer(buffers)?;

    let mut rows = Vec::new();
    while let Some(batch) = row_set_cursor.fetch()? {
        for row in 0..batch.num_rows() {
            rows.push(
                (0..batch.num_cols())
                    .map(|col| batch.at(col, row).map(|b| String::from_utf8_lossy(b).into_owned()))
                    .collect(),
            );
        }
    }
    debug!(columns = columns.len(), rows = rows.len(), "fetched result set");
    Ok(Table { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn management_query_aliases_match_record_columns() {
        for alias in ["PADStatus", "ManageName", "ManageType", "NVCClass", "nCells"] {
            assert!(MANAGEMENT_QUERY.contains(&format!("as {alias}")), "{alias}");
        }
        assert!(MANAGEMENT_QUERY.contains("--gap_landfire.nvc_group as NVCGroup"));
    }

    #[test]
    fn group_query_pivots_all_four_statuses() {
        assert!(NVC_GROUP_QUERY.contains("FOR NVC_Output.PADStatus IN ([1], [2], [3], [4])"));
        assert!(NVC_GROUP_QUERY.contains("MAX(NVC_Output.nCells)"));
        assert!(NVC_GROUP_QUERY.trim_end().ends_with("ORDER BY NVCGroup"));
    }

    #[test]
    fn column_lookup_ignores_case() {
        let table = Table {
            columns: vec!["PADStatus".to_string(), "ncells".to_string()],
            rows: Vec::new(),
        };
        assert_eq!(table.column_index("nCells").unwrap(), 1);
        assert!(matches!(
            table.column_index("NVCClass"),
            Err(QueryError::MissingColumn(c)) if c == "NVCClass"
        ));
        assert!(table.is_empty());
    }
}
