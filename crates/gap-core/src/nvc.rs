//! National Vegetation Classification classes kept by the summaries.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The five natural (non-anthropogenic) NVC classes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NvcClass {
    ForestWoodland,
    ShrubHerb,
    DesertSemiDesert,
    PolarHighMontane,
    OpenRock,
}

impl NvcClass {
    pub const ALL: [NvcClass; 5] = [
        NvcClass::ForestWoodland,
        NvcClass::ShrubHerb,
        NvcClass::DesertSemiDesert,
        NvcClass::PolarHighMontane,
        NvcClass::OpenRock,
    ];

    /// Class label exactly as stored in `gap_landfire.nvc_class`.
    pub fn label(self) -> &'static str {
        match self {
            NvcClass::ForestWoodland => "Forest & Woodland",
            NvcClass::ShrubHerb => "Shrub & Herb Vegetation",
            NvcClass::DesertSemiDesert => "Desert & Semi-Desert",
            NvcClass::PolarHighMontane => "Polar & High Montane Scrub, Grassland & Barrens",
            NvcClass::OpenRock => "Open Rock Vegetation",
        }
    }

    /// Label used on the management chart axis.
    pub fn short_label(self) -> &'static str {
        match self {
            NvcClass::PolarHighMontane => "Polar & High Montane",
            other => other.label(),
        }
    }

    /// Tick label used on the NVC class charts.
    pub fn abbreviation(self) -> &'static str {
        match self {
            NvcClass::ForestWoodland => "F & W",
            NvcClass::ShrubHerb => "S & H",
            NvcClass::DesertSemiDesert => "D & SD",
            NvcClass::PolarHighMontane => "PHMS",
            NvcClass::OpenRock => "ORV",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for NvcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// Rows that carry a raw NVC class label, `None` for a NULL class.
pub trait ClassLabeled {
    fn class_label(&self) -> Option<&str>;
}

/// Keep rows whose class is one of the five natural classes, pairing each
/// with its typed class. Anthropogenic, unknown and NULL labels are dropped.
/// Input order is preserved.
pub fn retain_natural_classes<R: ClassLabeled>(
    records: impl IntoIterator<Item = R>,
) -> Vec<(NvcClass, R)> {
    let mut dropped = 0usize;
    let kept: Vec<(NvcClass, R)> = records
        .into_iter()
        .filter_map(|r| match r.class_label().and_then(NvcClass::from_label) {
            Some(class) => Some((class, r)),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    debug!(kept = kept.len(), dropped, "filtered NVC classes");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, usize);

    impl ClassLabeled for Row {
        fn class_label(&self) -> Option<&str> {
            Some(self.0)
        }
    }

    struct Unlabeled;

    impl ClassLabeled for Unlabeled {
        fn class_label(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn labels_round_trip() {
        for class in NvcClass::ALL {
            assert_eq!(NvcClass::from_label(class.label()), Some(class));
        }
        assert_eq!(NvcClass::from_label("Polar & High Montane"), None);
        assert_eq!(NvcClass::from_label("forest & woodland"), None);
    }

    #[test]
    fn filter_keeps_only_natural_classes_in_order() {
        let rows = vec![
            Row("Developed & Other Human Use", 0),
            Row("Open Rock Vegetation", 1),
            Row("Agricultural Vegetation", 2),
            Row("Forest & Woodland", 3),
            Row("Polar & High Montane Scrub, Grassland & Barrens", 4),
            Row("Open Water", 5),
            Row("Forest & Woodland", 6),
        ];
        let kept = retain_natural_classes(rows);
        let ids: Vec<usize> = kept.iter().map(|(_, r)| r.1).collect();
        assert_eq!(ids, vec![1, 3, 4, 6]);
        assert_eq!(kept[0].0, NvcClass::OpenRock);
        assert_eq!(kept[2].0, NvcClass::PolarHighMontane);
        assert!(kept.iter().all(|(c, r)| c.label() == r.0));
    }

    #[test]
    fn filter_of_only_anthropogenic_rows_is_empty() {
        let rows = vec![Row("Developed & Other Human Use", 0), Row("Recently Disturbed", 1)];
        assert!(retain_natural_classes(rows).is_empty());
    }

    #[test]
    fn filter_drops_null_class() {
        assert!(retain_natural_classes(vec![Unlabeled, Unlabeled]).is_empty());
    }

    #[test]
    fn short_label_only_changes_polar_class() {
        assert_eq!(NvcClass::PolarHighMontane.short_label(), "Polar & High Montane");
        assert_eq!(NvcClass::ShrubHerb.short_label(), "Shrub & Herb Vegetation");
    }
}
