//! PAD-US manager name → coarse management category.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GapError, Result};
use crate::nvc::NvcClass;
use crate::records::CellCountRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManagementCategory {
    BureauOfLandManagement,
    ForestService,
    NationalParkService,
    FishAndWildlifeService,
    OtherFederal,
    State,
    Other,
}

impl ManagementCategory {
    /// Report order.
    pub const ALL: [ManagementCategory; 7] = [
        ManagementCategory::BureauOfLandManagement,
        ManagementCategory::ForestService,
        ManagementCategory::NationalParkService,
        ManagementCategory::FishAndWildlifeService,
        ManagementCategory::OtherFederal,
        ManagementCategory::State,
        ManagementCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ManagementCategory::BureauOfLandManagement => "Bureau of Land Management",
            ManagementCategory::ForestService => "Forest Service",
            ManagementCategory::NationalParkService => "National Park Service",
            ManagementCategory::FishAndWildlifeService => "U.S. Fish & Wildlife Service",
            ManagementCategory::OtherFederal => "Other Federal",
            ManagementCategory::State => "State",
            ManagementCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ManagementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

use ManagementCategory::{
    BureauOfLandManagement as Blm, FishAndWildlifeService as Fws, ForestService as Fs,
    NationalParkService as Nps, Other, OtherFederal, State,
};

/// `padus1_4.d_mang_nam` values and their categories.
pub const OWNER_CATEGORIES: [(&str, ManagementCategory); 32] = [
    ("Bureau of Land Management", Blm),
    ("Forest Service", Fs),
    ("National Park Service", Nps),
    ("U.S. Fish & Wildlife Service", Fws),
    ("American Indian Lands", Other),
    ("City Land", Other),
    ("County Land", Other),
    ("Joint", Other),
    ("Non-Governmental Organization", Other),
    ("Other", Other),
    ("Other or Unknown Local Government", Other),
    ("Private", Other),
    ("Regional Agency Land", Other),
    ("Regional Water Districts", Other),
    ("Unknown", Other),
    ("Agricultural Research Service", OtherFederal),
    ("Army Corps of Engineers", OtherFederal),
    ("Bureau of Indian Affairs", OtherFederal),
    ("Bureau of Reclamation", OtherFederal),
    ("Department of Defense", OtherFederal),
    ("Department of Energy", OtherFederal),
    ("National Oceanic and Atmospheric Administration", OtherFederal),
    ("Other or Unknown Federal Land", OtherFederal),
    ("Tennessee Valley Authority", OtherFederal),
    ("Natural Resources Conservation Service", OtherFederal),
    ("Other or Unknown State Land", State),
    ("State Department of Conservation", State),
    ("State Department of Land", State),
    ("State Department of Natural Resources", State),
    ("State Fish and Wildlife", State),
    ("State Land Board", State),
    ("State Park and Recreation", State),
];

/// How a NULL `ManageName` is listed among unmapped owners.
pub const NULL_OWNER_LABEL: &str = "<NULL>";

/// What to do with owner labels missing from [`OWNER_CATEGORIES`], NULL
/// owners included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedOwnerPolicy {
    /// Abort, listing every unmapped label.
    #[default]
    Fail,
    /// Warn once per label and count the area under `Other`.
    Other,
}

impl FromStr for UnmappedOwnerPolicy {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(UnmappedOwnerPolicy::Fail),
            "other" => Ok(UnmappedOwnerPolicy::Other),
            _ => Err(GapError::InvalidOption(format!(
                "unmapped owner policy {s:?} (expected 'fail' or 'other')"
            ))),
        }
    }
}

/// Lookup over the static owner table. Build once per run.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    table: HashMap<&'static str, ManagementCategory>,
    policy: UnmappedOwnerPolicy,
}

impl CategoryMapper {
    pub fn new(policy: UnmappedOwnerPolicy) -> Self {
        Self {
            table: OWNER_CATEGORIES.iter().copied().collect(),
            policy,
        }
    }

    pub fn policy(&self) -> UnmappedOwnerPolicy {
        self.policy
    }

    /// Table lookup only; `None` for labels the table does not list.
    pub fn lookup(&self, owner: &str) -> Option<ManagementCategory> {
        self.table.get(owner).copied()
    }

    /// Categorize every owner label in `owners`, applying the policy to NULL
    /// owners and to labels the table does not cover. Output is index-aligned
    /// with input.
    pub fn categorize_all<'a>(
        &self,
        owners: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<Vec<ManagementCategory>> {
        let mut unmapped: BTreeSet<&str> = BTreeSet::new();
        let categories: Vec<ManagementCategory> = owners
            .into_iter()
            .map(|owner| {
                owner.and_then(|o| self.lookup(o)).unwrap_or_else(|| {
                    unmapped.insert(owner.unwrap_or(NULL_OWNER_LABEL));
                    ManagementCategory::Other
                })
            })
            .collect();

        if unmapped.is_empty() {
            return Ok(categories);
        }
        match self.policy {
            UnmappedOwnerPolicy::Fail => Err(GapError::UnmappedOwners(
                unmapped.into_iter().map(str::to_string).collect(),
            )),
            UnmappedOwnerPolicy::Other => {
                for owner in &unmapped {
                    warn!(owner = %owner, "no management category for owner; counting as Other");
                }
                Ok(categories)
            }
        }
    }
}

impl Default for CategoryMapper {
    fn default() -> Self {
        Self::new(UnmappedOwnerPolicy::default())
    }
}

/// A natural-class row with its management category resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedRecord {
    pub category: ManagementCategory,
    pub class: NvcClass,
    pub record: CellCountRecord,
}

/// Attach a management category to each filtered row.
pub fn categorize_records(
    records: Vec<(NvcClass, CellCountRecord)>,
    mapper: &CategoryMapper,
) -> Result<Vec<CategorizedRecord>> {
    let categories = mapper.categorize_all(records.iter().map(|(_, r)| r.manage_name.as_deref()))?;
    Ok(records
        .into_iter()
        .zip(categories)
        .map(|((class, record), category)| CategorizedRecord {
            category,
            class,
            record,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_maps_literally() {
        let mapper = CategoryMapper::default();
        for (owner, category) in OWNER_CATEGORIES {
            assert_eq!(mapper.lookup(owner), Some(category), "owner {owner}");
        }
    }

    #[test]
    fn table_has_no_duplicate_owners() {
        let mapper = CategoryMapper::default();
        assert_eq!(mapper.table.len(), OWNER_CATEGORIES.len());
    }

    #[test]
    fn spot_check_pairs() {
        let mapper = CategoryMapper::default();
        assert_eq!(
            mapper.lookup("Bureau of Land Management"),
            Some(ManagementCategory::BureauOfLandManagement)
        );
        assert_eq!(mapper.lookup("Private"), Some(ManagementCategory::Other));
        assert_eq!(mapper.lookup("Department of Defense"), Some(ManagementCategory::OtherFederal));
        assert_eq!(mapper.lookup("State Land Board"), Some(ManagementCategory::State));
        assert_eq!(mapper.lookup("private"), None);
    }

    #[test]
    fn every_category_is_reachable() {
        for category in ManagementCategory::ALL {
            assert!(OWNER_CATEGORIES.iter().any(|(_, c)| *c == category), "{category}");
        }
    }

    #[test]
    fn fail_policy_lists_distinct_unmapped_labels() {
        let mapper = CategoryMapper::new(UnmappedOwnerPolicy::Fail);
        let err = mapper
            .categorize_all(
                ["Private", "Martian Land Office", "Forest Service", "Martian Land Office", "Atlantis"]
                    .map(Some),
            )
            .unwrap_err();
        match err {
            GapError::UnmappedOwners(labels) => {
                assert_eq!(labels, vec!["Atlantis".to_string(), "Martian Land Office".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_policy_buckets_unmapped_labels() {
        let mapper = CategoryMapper::new(UnmappedOwnerPolicy::Other);
        let cats = mapper
            .categorize_all(["Forest Service", "Martian Land Office"].map(Some))
            .unwrap();
        assert_eq!(cats, vec![ManagementCategory::ForestService, ManagementCategory::Other]);
    }

    #[test]
    fn categorize_records_keeps_rows_aligned() {
        use crate::records::GapStatus;
        let make = |owner: &str| CellCountRecord {
            pad_status: GapStatus::Status1,
            manage_name: Some(owner.to_string()),
            manage_type: String::new(),
            nvc_class: Some(NvcClass::ShrubHerb.label().to_string()),
            nvc_group: None,
            n_cells: 1,
        };
        let rows = vec![
            (NvcClass::ShrubHerb, make("National Park Service")),
            (NvcClass::ShrubHerb, make("Joint")),
        ];
        let out = categorize_records(rows, &CategoryMapper::default()).unwrap();
        assert_eq!(out[0].category, ManagementCategory::NationalParkService);
        assert_eq!(out[0].record.manage_name.as_deref(), Some("National Park Service"));
        assert_eq!(out[1].category, ManagementCategory::Other);
    }

    #[test]
    fn null_owner_follows_unmapped_policy() {
        let owners = [Some("Forest Service"), None, Some("Atlantis")];

        let err = CategoryMapper::new(UnmappedOwnerPolicy::Fail)
            .categorize_all(owners)
            .unwrap_err();
        match err {
            GapError::UnmappedOwners(labels) => {
                assert_eq!(labels, vec!["<NULL>".to_string(), "Atlantis".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }

        let cats = CategoryMapper::new(UnmappedOwnerPolicy::Other)
            .categorize_all(owners)
            .unwrap();
        assert_eq!(
            cats,
            vec![ManagementCategory::ForestService, ManagementCategory::Other, ManagementCategory::Other]
        );
    }

    #[test]
    fn null_owner_in_dropped_class_never_reaches_mapper() {
        use crate::nvc::retain_natural_classes;
        use crate::records::GapStatus;
        let rows = vec![
            CellCountRecord {
                pad_status: GapStatus::Status2,
                manage_name: None,
                manage_type: String::new(),
                nvc_class: Some("Open Water".to_string()),
                nvc_group: None,
                n_cells: 5,
            },
            CellCountRecord {
                pad_status: GapStatus::Status1,
                manage_name: Some("Private".to_string()),
                manage_type: String::new(),
                nvc_class: Some(NvcClass::ForestWoodland.label().to_string()),
                nvc_group: None,
                n_cells: 10,
            },
        ];
        let natural = retain_natural_classes(rows);
        let out = categorize_records(natural, &CategoryMapper::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, ManagementCategory::Other);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("FAIL".parse::<UnmappedOwnerPolicy>().unwrap(), UnmappedOwnerPolicy::Fail);
        assert_eq!("other".parse::<UnmappedOwnerPolicy>().unwrap(), UnmappedOwnerPolicy::Other);
        assert!("ignore".parse::<UnmappedOwnerPolicy>().is_err());
    }
}
