use crate::reagent::ReagentCode;
use crate::well::WellAddress;
use std::collections::BTreeMap;

/// Demand side: which reagents each well of a synthesis plate must receive.
///
/// Wells iterate in row-major order via the `BTreeMap`; the reagent list of
/// a well keeps the order the codes were declared in the layout file.
#[derive(Clone, Debug, Default)]
pub struct TargetPlate {
    /// 1-based display number, assigned in file-discovery order.
    pub number: usize,
    pub name: String,
    pub wells: BTreeMap<WellAddress, Vec<ReagentCode>>,
}

impl TargetPlate {
    pub fn new(number: usize, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            wells: BTreeMap::new(),
        }
    }
}

/// Supply side: one physical plate of the source allocation. Every filled
/// well holds exactly one reagent.
#[derive(Clone, Debug)]
pub struct SourcePlate {
    /// 1-based display number, used for `Source{n}` barcodes and file names.
    pub number: usize,
    /// Shared plates are labeled `source`, fallback plates by their category.
    pub label: String,
    pub wells: BTreeMap<WellAddress, ReagentCode>,
}

/// The packed source allocation: plates in allocation order.
#[derive(Clone, Debug, Default)]
pub struct SourceLayout {
    pub plates: Vec<SourcePlate>,
}

impl SourceLayout {
    pub fn total_assigned(&self) -> usize {
        self.plates.iter().map(|plate| plate.wells.len()).sum()
    }

    pub fn wells_assigned_to(&self, code: &ReagentCode) -> usize {
        self.plates
            .iter()
            .map(|plate| plate.wells.values().filter(|assigned| *assigned == code).count())
            .sum()
    }
}
