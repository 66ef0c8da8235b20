//! Display order for management summary rows.

use crate::management::ManagementCategory::{
    self, BureauOfLandManagement as Blm, FishAndWildlifeService as Fws, ForestService as Fs,
    NationalParkService as Nps, Other, OtherFederal, State,
};
use crate::nvc::NvcClass::{
    self, DesertSemiDesert as Desert, ForestWoodland as Forest, OpenRock, PolarHighMontane as Polar,
    ShrubHerb as Shrub,
};

/// Row priority, first entry first.
pub const ROW_ORDER: [(ManagementCategory, NvcClass); 35] = [
    (Blm, Forest),
    (Blm, Shrub),
    (Blm, Desert),
    (Blm, Polar),
    (Blm, OpenRock),
    (Fs, Forest),
    (Fs, Shrub),
    (Fs, Desert),
    (Fs, Polar),
    (Fs, OpenRock),
    (Nps, Forest),
    (Nps, Shrub),
    (Nps, Desert),
    (Nps, Polar),
    (Nps, OpenRock),
    (Fws, Forest),
    (Fws, Shrub),
    (Fws, Desert),
    (Fws, Polar),
    (Fws, OpenRock),
    (OtherFederal, Forest),
    (OtherFederal, Shrub),
    (OtherFederal, Desert),
    (OtherFederal, Polar),
    (OtherFederal, OpenRock),
    (State, Forest),
    (State, Shrub),
    (State, Desert),
    (State, Polar),
    (State, OpenRock),
    (Other, Forest),
    (Other, Shrub),
    (Other, Desert),
    (Other, Polar),
    (Other, OpenRock),
];

/// 1-based rank of a pair, `None` if the table has no entry for it.
pub fn rank(category: ManagementCategory, class: NvcClass) -> Option<usize> {
    ROW_ORDER
        .iter()
        .position(|&(c, k)| c == category && k == class)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_covers_every_pair_once() {
        let unique: HashSet<_> = ROW_ORDER.iter().collect();
        assert_eq!(unique.len(), ROW_ORDER.len());
        for category in ManagementCategory::ALL {
            for class in NvcClass::ALL {
                assert!(rank(category, class).is_some(), "{category} / {class}");
            }
        }
    }

    #[test]
    fn ranks_follow_category_then_class() {
        assert_eq!(rank(Blm, Forest), Some(1));
        assert_eq!(rank(Blm, Shrub), Some(2));
        assert_eq!(rank(Fs, Forest), Some(6));
        assert_eq!(rank(OtherFederal, Polar), Some(24));
        assert_eq!(rank(Other, OpenRock), Some(35));
    }
}
