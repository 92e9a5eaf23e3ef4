use crate::capacity::{CapacityPlan, plan_capacity};
use crate::config::PlannerConfig;
use crate::demand::{DemandMap, aggregate_demand};
use crate::error::{Diagnostic, PlanError};
use crate::matcher::{Transfer, match_transfers};
use crate::packer::pack_source_layout;
use crate::plate::{SourceLayout, TargetPlate};
use crate::schedule::{order_stage_one, order_stage_two};

/// Everything one planning run produces. The transfer lists are already in
/// instrument order; the demand map and capacity plan are kept for
/// reporting.
#[derive(Clone, Debug)]
pub struct PlanOutcome {
    pub demand: DemandMap,
    pub capacity: CapacityPlan,
    pub layout: SourceLayout,
    pub stage_one: Vec<Transfer>,
    pub stage_two: Vec<Transfer>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanOutcome {
    pub fn unmet_demand(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_unmet_demand())
    }

    pub fn has_unmet_demand(&self) -> bool {
        self.unmet_demand().next().is_some()
    }
}

/// Run the full pipeline: demand aggregation, capacity planning, source
/// layout packing, transfer matching, stage ordering.
///
/// Structural problems (bad configuration, infeasible packing, malformed
/// input) abort with an error before anything is produced. Per-demand-unit
/// problems come back as diagnostics next to the transfers that did match.
pub fn plan(targets: &[TargetPlate], config: &PlannerConfig) -> Result<PlanOutcome, PlanError> {
    config.validate()?;
    let demand = aggregate_demand(targets)?;
    let capacity = plan_capacity(&demand, config)?;
    let layout = pack_source_layout(&capacity, config)?;
    let mut matched = match_transfers(&layout, targets, config, capacity.transfers_per_well);
    order_stage_one(&mut matched.stage_one);
    order_stage_two(&mut matched.stage_two);
    Ok(PlanOutcome {
        demand,
        capacity,
        layout,
        stage_one: matched.stage_one,
        stage_two: matched.stage_two,
        diagnostics: matched.diagnostics,
    })
}
