use crate::config::PlannerConfig;
use crate::demand::DemandMap;
use crate::error::PlanError;
use crate::reagent::ReagentCode;
use itertools::Itertools;

/// How many draws one filled source well supports, and how many source
/// wells each reagent therefore needs.
#[derive(Clone, Debug)]
pub struct CapacityPlan {
    pub transfers_per_well: u32,
    /// Sorted by numeric suffix, then category letter, so downstream
    /// packing is deterministic.
    pub wells_per_reagent: Vec<(ReagentCode, u32)>,
}

impl CapacityPlan {
    pub fn reagents_of_category(&self, category: char) -> impl Iterator<Item = &(ReagentCode, u32)> {
        self.wells_per_reagent
            .iter()
            .filter(move |(code, _)| code.category() == category)
    }

    pub fn wells_for_category(&self, category: char) -> u32 {
        self.reagents_of_category(category).map(|(_, wells)| wells).sum()
    }

    pub fn total_wells(&self) -> u32 {
        self.wells_per_reagent.iter().map(|(_, wells)| wells).sum()
    }
}

/// Derive the source well requirement from the demand map.
///
/// A well holding `source_well_capacity` volume units supports
/// `capacity / transfer_volume` draws. Every demanded reagent gets
/// `demand / transfers_per_well + 1` wells, accepting one spare well when
/// demand divides evenly.
pub fn plan_capacity(demand: &DemandMap, config: &PlannerConfig) -> Result<CapacityPlan, PlanError> {
    if config.transfer_volume == 0 {
        return Err(PlanError::Configuration("Transfer volume must be at least 1".to_string()));
    }
    let transfers_per_well = config.source_well_capacity / config.transfer_volume;
    if transfers_per_well == 0 {
        return Err(PlanError::Configuration(format!(
            "Source well capacity {} cannot hold a single transfer of volume {}",
            config.source_well_capacity, config.transfer_volume
        )));
    }
    let wells_per_reagent = demand
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(code, count)| (code.clone(), count / transfers_per_well + 1))
        .sorted_by_key(|(code, _)| code.sort_key())
        .collect();
    Ok(CapacityPlan {
        transfers_per_well,
        wells_per_reagent,
    })
}
