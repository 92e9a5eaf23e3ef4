use crate::capacity::CapacityPlan;
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::plate::{SourceLayout, SourcePlate};
use crate::reagent::ReagentCode;
use crate::well::WellAddress;
use itertools::repeat_n;
use std::collections::BTreeMap;
use std::ops::Range;

/// Label given to the shared plate of the single-plate layout.
const SHARED_PLATE_LABEL: &str = "source";

/// Well requirement of one category next to the row band it may use on a
/// shared plate.
#[derive(Clone, Debug)]
struct BandRequirement {
    category: char,
    wells_needed: u32,
    band: Range<u8>,
}

fn band_requirements(plan: &CapacityPlan, config: &PlannerConfig) -> Vec<BandRequirement> {
    let bands = config.plate_format().row_bands(config.categories.len());
    config
        .categories
        .iter()
        .zip(bands)
        .map(|(&category, band)| BandRequirement {
            category,
            wells_needed: plan.wells_for_category(category),
            band,
        })
        .collect()
}

/// Pure feasibility check for the shared-plate layout: every category must
/// fit inside its own row band.
fn fits_banded(requirements: &[BandRequirement], columns: u16) -> bool {
    requirements
        .iter()
        .all(|req| req.wells_needed as usize <= req.band.len() * columns as usize)
}

/// The wells a category consumes, one entry per required well, reagents in
/// planner order.
fn category_assignments<'a>(
    plan: &'a CapacityPlan,
    category: char,
) -> impl Iterator<Item = ReagentCode> + 'a {
    plan.reagents_of_category(category)
        .flat_map(|(code, wells)| repeat_n(code.clone(), *wells as usize))
}

/// Assign every demanded reagent its source wells.
///
/// Preferred topology is a single plate whose rows are split into one band
/// per category; if any band would overflow, each category instead gets a
/// dedicated plate filled across all rows. Feasibility is decided up front,
/// before any placement happens, so a failed attempt never leaves a partial
/// allocation behind.
pub fn pack_source_layout(plan: &CapacityPlan, config: &PlannerConfig) -> Result<SourceLayout, PlanError> {
    let format = config.plate_format();
    let requirements = band_requirements(plan, config);

    if fits_banded(&requirements, config.columns) {
        let mut wells: BTreeMap<WellAddress, ReagentCode> = BTreeMap::new();
        for req in &requirements {
            let free = format.band_wells(req.band.clone());
            for (code, well) in category_assignments(plan, req.category).zip(free) {
                wells.insert(well, code);
            }
        }
        return Ok(SourceLayout {
            plates: vec![SourcePlate {
                number: 1,
                label: SHARED_PLATE_LABEL.to_string(),
                wells,
            }],
        });
    }

    // One dedicated plate per category that needs any wells.
    let mut plates = vec![];
    for req in &requirements {
        if req.wells_needed == 0 {
            continue;
        }
        if req.wells_needed as usize > format.well_count() {
            return Err(PlanError::CapacityExceeded(format!(
                "Category {} needs {} source wells but a {}x{} plate holds {}; \
                 cannot exceed one source plate per category",
                req.category,
                req.wells_needed,
                format.rows,
                format.columns,
                format.well_count()
            )));
        }
        let mut wells: BTreeMap<WellAddress, ReagentCode> = BTreeMap::new();
        for (code, well) in category_assignments(plan, req.category).zip(format.wells_row_major()) {
            wells.insert(well, code);
        }
        plates.push(SourcePlate {
            number: plates.len() + 1,
            label: req.category.to_string(),
            wells,
        });
    }
    Ok(SourceLayout { plates })
}
